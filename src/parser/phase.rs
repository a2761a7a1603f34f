#[derive(Debug, Default, Clone, Copy, PartialEq, PartialOrd)]
pub enum Phase {
    #[default]
    Projection = 0,
    Tables = 1,
    Joins = 2,
    Criteria = 3,
    Trailing = 4,
    EOF = 5,
}
