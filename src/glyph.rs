use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// (operator, display glyph, evaluator symbol)
///
/// The only place that knows how an operator is shown and how the evaluator
/// spells it. Both translation directions are derived from these rows.
pub const GLYPH_TABLE: [(Operator, char, char); 4] = [
    (Operator::Add, '+', '+'),
    (Operator::Subtract, '-', '-'),
    (Operator::Multiply, '×', '*'),
    (Operator::Divide, '÷', '/'),
];

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    // rows are ordered by discriminant
    fn entry(self) -> (Operator, char, char) {
        GLYPH_TABLE[self as usize]
    }

    pub fn glyph(self) -> char {
        self.entry().1
    }

    pub fn evaluator_symbol(self) -> char {
        self.entry().2
    }

    pub fn from_glyph(c: char) -> Option<Self> {
        GLYPH_TABLE
            .into_iter()
            .find(|(_, glyph, _)| *glyph == c)
            .map(|(op, _, _)| op)
    }

    pub fn from_evaluator_symbol(c: char) -> Option<Self> {
        GLYPH_TABLE
            .into_iter()
            .find(|(_, _, symbol)| *symbol == c)
            .map(|(op, _, _)| op)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

/// Replace every display glyph in `display` with its evaluator symbol.
pub fn to_evaluator_syntax(display: &str) -> String {
    display
        .chars()
        .map(|c| Operator::from_glyph(c).map_or(c, Operator::evaluator_symbol))
        .collect()
}

/// Replace every evaluator operator symbol in `source` with its display glyph.
pub fn to_display_glyphs(source: &str) -> String {
    source
        .chars()
        .map(|c| Operator::from_evaluator_symbol(c).map_or(c, Operator::glyph))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_covers_every_operator_once() {
        for op in Operator::ALL {
            assert_eq!(GLYPH_TABLE.iter().filter(|(o, _, _)| *o == op).count(), 1);
            assert_eq!(GLYPH_TABLE[op as usize].0, op);
        }
    }

    #[test]
    fn glyph_and_symbol_lookup_agree() {
        for (op, glyph, symbol) in GLYPH_TABLE {
            assert_eq!(Operator::from_glyph(glyph), Some(op));
            assert_eq!(Operator::from_evaluator_symbol(symbol), Some(op));
            assert_eq!(op.glyph(), glyph);
            assert_eq!(op.evaluator_symbol(), symbol);
        }
    }

    #[test]
    fn multiplication_and_division_are_translated() {
        assert_eq!(to_evaluator_syntax("1.5×(2+3)"), "1.5*(2+3)");
        assert_eq!(to_evaluator_syntax("8÷2-1"), "8/2-1");
        assert_eq!(to_display_glyphs("8/2*3"), "8÷2×3");
    }

    #[test]
    fn non_operator_characters_pass_through() {
        assert_eq!(to_evaluator_syntax("(12.5)"), "(12.5)");
        assert_eq!(to_display_glyphs("Infinity"), "Infinity");
    }

    #[test]
    fn unknown_glyphs_are_not_operators() {
        assert_eq!(Operator::from_glyph('x'), None);
        assert_eq!(Operator::from_glyph('*'), None);
        assert_eq!(Operator::from_evaluator_symbol('×'), None);
    }

    #[test]
    fn display_uses_glyph() {
        assert_eq!(Operator::Multiply.to_string(), "×");
        assert_eq!(Operator::Divide.to_string(), "÷");
    }
}
