/// Anything looked up by a user-typed name (entities, periods).
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// One-line summary used in shell confirmations.
pub trait Displayable {
    fn display_label(&self) -> String;
}
