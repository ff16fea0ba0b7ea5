// src/services/document_service.rs

use chrono::NaiveDate;
use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{
    common::error::AppError,
    models::requests::{DemoRequest, RequestListEntry},
};

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_else(|| "-".into())
}

fn text(value: &Option<String>) -> String {
    value.as_deref().filter(|v| !v.trim().is_empty()).unwrap_or("-").to_string()
}

// Linhas "rótulo: valor" de cada seção da ficha
pub fn request_rows(entry: &RequestListEntry) -> Vec<(&'static str, String)> {
    let r = &entry.request;
    vec![
        ("Salesperson", entry.salesperson_name.clone()),
        ("Distributor", entry.distributor_name.clone()),
        ("Machine", format!("{} / {}", entry.machine_name, r.model)),
        ("Demo type", r.demo_type.clone()),
        ("Proposed date", date(r.proposed_date)),
        ("Expected duration", text(&r.expected_duration)),
        ("Applications", if r.application_params.is_empty() {
            "-".into()
        } else {
            r.application_params.join(", ")
        }),
        ("Doctor", text(&r.doctor_name)),
        ("Department", text(&r.doctor_department)),
        ("Hospital", text(&r.hospital_name)),
        ("Location", text(&r.location)),
        ("Urgency", text(&r.urgency_level)),
        ("Expected return", date(r.expected_return_date)),
    ]
}

pub fn logistics_rows(r: &DemoRequest) -> Vec<(&'static str, String)> {
    vec![
        ("Status", r.status.to_string()),
        ("Serial number", text(&r.machine_serial_number)),
        ("Dispatched by", text(&r.dispatched_by)),
        ("Dispatch date", date(r.dispatch_date)),
        ("Courier", text(&r.courier_details)),
        ("Tracking number", text(&r.tracking_number)),
        ("Received on", date(r.received_date)),
        ("Remarks", text(&r.remarks)),
    ]
}

pub fn approval_line(r: &DemoRequest) -> String {
    if r.regional_manager_approval {
        format!(
            "Approved by regional manager {} on {}",
            text(&r.regional_manager_name),
            date(r.approval_date)
        )
    } else {
        "Regional manager approval pending".into()
    }
}

fn pdf_err(e: impl std::fmt::Display) -> AppError {
    AppError::DocumentError(e.to_string())
}

#[derive(Clone)]
pub struct DocumentService {
    font_dir: String,
}

impl DocumentService {
    pub fn new(font_dir: String) -> Self {
        Self { font_dir }
    }

    /// Ficha da solicitação em PDF, com QR code do readableId.
    pub fn generate_request_pdf(&self, entry: &RequestListEntry) -> Result<Vec<u8>, AppError> {
        let r = &entry.request;

        // Carrega a fonte da pasta configurada em FONT_DIR
        let font_family = genpdf::fonts::from_files(&self.font_dir, "Roboto", None)
            .map_err(|_| pdf_err(format!("font 'Roboto' not found in {}", self.font_dir)))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Demo request {}", r.readable_id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new(format!("DEMO REQUEST #{}", r.readable_id))
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Submitted on {}",
            r.created_at.format("%d/%m/%Y")
        )));
        doc.push(elements::Break::new(1.5));

        let style_bold = style::Style::new().bold();
        for (title, rows) in [
            ("Request", request_rows(entry)),
            ("Logistics", logistics_rows(r)),
        ] {
            doc.push(elements::Paragraph::new(title).styled(style_bold.with_font_size(13)));
            let mut table = elements::TableLayout::new(vec![1, 2]);
            table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
            for (label, value) in rows {
                table
                    .row()
                    .element(elements::Paragraph::new(label).styled(style_bold))
                    .element(elements::Paragraph::new(value))
                    .push()
                    .map_err(pdf_err)?;
            }
            doc.push(table);
            doc.push(elements::Break::new(1));
        }

        // --- KIT ---
        if !r.kit_items.0.is_empty() {
            doc.push(elements::Paragraph::new("Kit items").styled(style_bold.with_font_size(13)));
            let mut table = elements::TableLayout::new(vec![4, 1, 1]);
            table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
            table
                .row()
                .element(elements::Paragraph::new("Kit").styled(style_bold))
                .element(elements::Paragraph::new("Qty").styled(style_bold))
                .element(elements::Paragraph::new("Unit").styled(style_bold))
                .push()
                .map_err(pdf_err)?;
            for item in r.kit_items.0.iter() {
                table
                    .row()
                    .element(elements::Paragraph::new(item.kit_name.as_str()))
                    .element(elements::Paragraph::new(item.quantity.to_string()))
                    .element(elements::Paragraph::new(text(&item.unit)))
                    .push()
                    .map_err(pdf_err)?;
            }
            doc.push(table);
            doc.push(elements::Break::new(1));
        }

        doc.push(elements::Paragraph::new(approval_line(r)).styled(style::Style::new().italic()));
        doc.push(elements::Break::new(1.5));

        // --- QR CODE ---
        let code = QrCode::new(r.readable_id.as_bytes()).map_err(pdf_err)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(pdf_err)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(pdf_image);

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_err)?;

        tracing::debug!(request = %r.id, bytes = buffer.len(), "PDF gerado");
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::requests::{KitItem, RequestStatus};
    use chrono::Utc;
    use sqlx::types::Json;
    use uuid::Uuid;

    fn entry() -> RequestListEntry {
        let now = Utc::now();
        RequestListEntry {
            request: DemoRequest {
                id: Uuid::new_v4(),
                readable_id: "200001".into(),
                salesperson_id: Uuid::new_v4(),
                distributor_id: Uuid::new_v4(),
                machine_id: Uuid::new_v4(),
                model: "HA-5000".into(),
                demo_type: "Product Evaluation".into(),
                proposed_date: NaiveDate::from_ymd_opt(2025, 3, 9),
                expected_duration: Some("1 week".into()),
                application_params: vec!["CBC".into(), "ESR".into()],
                sample_volume: None,
                special_requirements: None,
                kit_items: Json(vec![KitItem {
                    kit_id: None,
                    kit_name: "CBC Panel".into(),
                    quantity: 2,
                    unit: None,
                }]),
                business_potential: None,
                competitor_details: None,
                reason_for_demo: None,
                urgency_level: Some("  ".into()),
                regional_manager_approval: true,
                regional_manager_name: Some("Anita".into()),
                approval_date: NaiveDate::from_ymd_opt(2025, 3, 1),
                expected_purchase_date: None,
                doctor_name: None,
                doctor_department: None,
                hospital_name: Some("City Hospital".into()),
                location: None,
                expected_return_date: None,
                status: RequestStatus::Dispatched,
                machine_serial_number: Some("SN-1".into()),
                dispatched_by: None,
                dispatch_date: None,
                courier_details: None,
                tracking_number: None,
                condition_on_return: None,
                remarks: None,
                received_date: None,
                created_at: now,
                updated_at: now,
            },
            salesperson_name: "Priya".into(),
            salesperson_email: "priya@example.com".into(),
            distributor_name: "MedSupply".into(),
            machine_name: "Hematology Analyzer".into(),
        }
    }

    fn value<'a>(rows: &'a [(&'static str, String)], label: &str) -> &'a str {
        rows.iter().find(|(l, _)| *l == label).map(|(_, v)| v.as_str()).unwrap()
    }

    #[test]
    fn request_rows_format_dates_and_lists() {
        let rows = request_rows(&entry());
        assert_eq!(value(&rows, "Proposed date"), "09/03/2025");
        assert_eq!(value(&rows, "Applications"), "CBC, ESR");
        assert_eq!(value(&rows, "Machine"), "Hematology Analyzer / HA-5000");
        assert_eq!(value(&rows, "Urgency"), "-");
    }

    #[test]
    fn logistics_rows_show_status_and_serial() {
        let e = entry();
        let rows = logistics_rows(&e.request);
        assert_eq!(value(&rows, "Status"), "dispatched");
        assert_eq!(value(&rows, "Serial number"), "SN-1");
        assert_eq!(value(&rows, "Received on"), "-");
    }

    #[test]
    fn approval_line_names_manager() {
        let e = entry();
        assert_eq!(approval_line(&e.request), "Approved by regional manager Anita on 01/03/2025");
    }

    #[test]
    fn missing_fonts_become_document_error() {
        let service = DocumentService::new("/nonexistent/fonts".into());
        let err = service.generate_request_pdf(&entry()).unwrap_err();
        assert!(matches!(err, AppError::DocumentError(_)));
    }
}
