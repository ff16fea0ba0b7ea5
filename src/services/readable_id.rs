// src/services/readable_id.rs

//! Cálculo do identificador legível das solicitações: `{userIndex}{sequência:05}`.
//!
//! A sequência é a marca d'água por vendedor + 1, nunca uma contagem de linhas.
//! Contar linhas repete ids depois de uma exclusão.

pub const SEQUENCE_WIDTH: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub sequence: i32,
    pub readable_id: String,
}

pub fn format_readable_id(user_index: i32, sequence: i32) -> String {
    format!("{}{:0width$}", user_index, sequence, width = SEQUENCE_WIDTH)
}

// Extrai a sequência de um id do próprio vendedor.
// Ids com outro prefixo (ex.: índice reatribuído em manutenção) são ignorados.
pub fn parse_sequence(user_index: i32, readable_id: &str) -> Option<i32> {
    let rest = readable_id.strip_prefix(user_index.to_string().as_str())?;
    if rest.len() < SEQUENCE_WIDTH || !rest.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Próximo id do vendedor.
///
/// `high_water` é o contador persistido (`users.request_seq`), `existing` os ids
/// ainda gravados para o vendedor. O resultado fica acima dos dois, então
/// exclusões nunca fazem um id voltar.
pub fn assign<'a, I>(user_index: i32, high_water: i32, existing: I) -> Assignment
where
    I: IntoIterator<Item = &'a str>,
{
    let stored_max = existing
        .into_iter()
        .filter_map(|id| parse_sequence(user_index, id))
        .max()
        .unwrap_or(0);

    let sequence = high_water.max(stored_max) + 1;
    Assignment {
        sequence,
        readable_id: format_readable_id(user_index, sequence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    // Livro-razão em memória com as mesmas regras do serviço:
    // contador por vendedor + ids gravados + unicidade global.
    #[derive(Default)]
    struct Ledger {
        salespeople: HashMap<&'static str, (i32, i32)>,
        requests: Vec<(&'static str, String)>,
    }

    impl Ledger {
        fn with(people: &[(&'static str, i32)]) -> Self {
            let mut ledger = Ledger::default();
            for (name, index) in people {
                ledger.salespeople.insert(*name, (*index, 0));
            }
            ledger
        }

        fn create(&mut self, who: &'static str) -> String {
            let (index, high_water) = self.salespeople[who];
            let existing: Vec<&str> = self
                .requests
                .iter()
                .filter(|(owner, _)| *owner == who)
                .map(|(_, id)| id.as_str())
                .collect();
            let assignment = assign(index, high_water, existing);
            assert!(
                self.requests.iter().all(|(_, id)| *id != assignment.readable_id),
                "duplicate readable id {}",
                assignment.readable_id
            );
            self.salespeople.insert(who, (index, assignment.sequence));
            self.requests.push((who, assignment.readable_id.clone()));
            assignment.readable_id
        }

        fn delete(&mut self, readable_id: &str) {
            self.requests.retain(|(_, id)| id != readable_id);
        }
    }

    #[rstest]
    #[case(1, 5, "100005")]
    #[case(2, 1, "200001")]
    #[case(0, 42, "000042")]
    #[case(12, 123456, "12123456")]
    fn formats_index_and_padded_sequence(
        #[case] index: i32,
        #[case] sequence: i32,
        #[case] expected: &str,
    ) {
        assert_eq!(format_readable_id(index, sequence), expected);
    }

    #[rstest]
    #[case(1, "100007", Some(7))]
    #[case(1, "200007", None)]
    #[case(1, "10007", None)]
    #[case(1, "1000x7", None)]
    #[case(12, "12123456", Some(123456))]
    fn parses_only_own_prefix(#[case] index: i32, #[case] id: &str, #[case] expected: Option<i32>) {
        assert_eq!(parse_sequence(index, id), expected);
    }

    #[test]
    fn sequence_is_monotonic_for_user_index_two() {
        let mut ledger = Ledger::with(&[("priya", 2), ("rahul", 1)]);
        let other = ledger.create("rahul");
        assert_eq!(ledger.create("priya"), "200001");
        ledger.delete(&other);
        assert_eq!(ledger.create("priya"), "200002");
    }

    #[test]
    fn deleting_an_earlier_request_never_reuses_an_id() {
        let mut ledger = Ledger::with(&[("rahul", 1)]);
        let a = ledger.create("rahul");
        let b = ledger.create("rahul");
        assert_eq!((a.as_str(), b.as_str()), ("100001", "100002"));

        ledger.delete(&a);
        let c = ledger.create("rahul");

        assert_ne!(c, b);
        assert_eq!(c, "100003");
    }

    #[test]
    fn deleting_the_latest_request_does_not_lower_the_counter() {
        let mut ledger = Ledger::with(&[("rahul", 1)]);
        ledger.create("rahul");
        let b = ledger.create("rahul");
        ledger.delete(&b);
        assert_eq!(ledger.create("rahul"), "100003");
    }

    #[test]
    fn salespeople_sequences_are_independent() {
        let mut ledger = Ledger::with(&[("rahul", 1), ("priya", 2)]);
        assert_eq!(ledger.create("rahul"), "100001");
        let p1 = ledger.create("priya");
        let p2 = ledger.create("priya");
        ledger.delete(&p1);
        ledger.delete(&p2);
        assert_eq!(ledger.create("rahul"), "100002");
        assert_eq!(ledger.create("priya"), "200003");
    }

    #[test]
    fn stored_ids_above_the_counter_win() {
        // Bases antigas: ids gravados por contagem, contador ainda zerado
        let next = assign(1, 0, ["100001", "100004"]);
        assert_eq!(next.sequence, 5);
        assert_eq!(next.readable_id, "100005");
    }

    #[test]
    fn row_count_would_collide_where_high_water_does_not() {
        let remaining = ["100002"];
        let by_count = format_readable_id(1, remaining.len() as i32 + 1);
        assert_eq!(by_count, "100002");

        let by_high_water = assign(1, 2, remaining);
        assert_eq!(by_high_water.readable_id, "100003");
    }
}
