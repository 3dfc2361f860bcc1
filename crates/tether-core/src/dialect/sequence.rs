use super::Dialect;

impl Dialect {
    /// Name of the sequence backing a generated id column.
    ///
    /// An explicitly configured name wins; otherwise one is derived from the
    /// table and column. Either way the dialect's case convention applies.
    pub fn id_sequence_name(&self, table: &str, column: &str, explicit: Option<&str>) -> String {
        match explicit {
            Some(name) => self.normalize_entity_name(name),
            None => self.normalize_entity_name(&format!("{table}_{column}_seq")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_name() {
        let dialect = Dialect::postgresql();
        assert_eq!(dialect.id_sequence_name("foo", "id", None), "foo_id_seq");
        assert_eq!(dialect.id_sequence_name("foo", "id", Some("seq")), "seq");
    }

    #[test]
    fn upper_case_dialect() {
        let dialect = Dialect::oracle();
        assert_eq!(dialect.id_sequence_name("foo", "id", None), "FOO_ID_SEQ");
        assert_eq!(dialect.id_sequence_name("foo", "id", Some("seq")), "SEQ");
    }
}
