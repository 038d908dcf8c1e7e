//! The sparse simplex tableau.
//!
//! The tableau maps basic symbols to the rows that define them and keeps a
//! reverse index from parametric symbols to the set of rows mentioning them.
//! Every mutation updates both directions in lockstep, so the solver can walk
//! a column without scanning the whole tableau.

use std::fmt;

use indexmap::{IndexMap, IndexSet};

use tether_core::near_zero;

/// Internal solver symbols.
///
/// Externals are the client's decision variables; the other kinds are minted
/// by the solver while constraints are added. Slack symbols are restricted to
/// be non-negative and may pivot; dummies are restricted markers that never
/// enter the basis; objective symbols key objective rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) enum Sym {
    External(usize),
    Slack(usize),
    Dummy(usize),
    Objective(usize),
}

impl Sym {
    pub(crate) fn is_external(self) -> bool {
        matches!(self, Sym::External(_))
    }

    pub(crate) fn is_restricted(self) -> bool {
        matches!(self, Sym::Slack(_) | Sym::Dummy(_))
    }

    pub(crate) fn is_pivotable(self) -> bool {
        matches!(self, Sym::Slack(_))
    }

    pub(crate) fn is_dummy(self) -> bool {
        matches!(self, Sym::Dummy(_))
    }
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sym::External(id) => write!(f, "v{}", id),
            Sym::Slack(id) => write!(f, "s{}", id),
            Sym::Dummy(id) => write!(f, "d{}", id),
            Sym::Objective(id) => write!(f, "z{}", id),
        }
    }
}

/// A linear expression over symbols: `constant + Σ(coefficient · symbol)`.
///
/// Cells whose coefficient falls within epsilon of zero are dropped.
#[derive(Debug, Clone, Default)]
pub(crate) struct Row {
    pub(crate) constant: f64,
    pub(crate) cells: IndexMap<Sym, f64>,
}

impl Row {
    pub(crate) fn new(constant: f64) -> Self {
        Self {
            constant,
            cells: IndexMap::new(),
        }
    }

    pub(crate) fn coefficient(&self, sym: Sym) -> f64 {
        self.cells.get(&sym).copied().unwrap_or(0.0)
    }

    pub(crate) fn contains(&self, sym: Sym) -> bool {
        self.cells.contains_key(&sym)
    }

    pub(crate) fn is_constant(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn cells(&self) -> impl Iterator<Item = (&Sym, &f64)> {
        self.cells.iter()
    }

    /// Add `coefficient · sym`, merging with any existing cell.
    pub(crate) fn add(&mut self, sym: Sym, coefficient: f64) {
        let entry = self.cells.entry(sym).or_insert(0.0);
        *entry += coefficient;
        if near_zero(*entry) {
            self.cells.swap_remove(&sym);
        }
    }

    /// Set the coefficient of `sym`, replacing any existing cell.
    pub(crate) fn insert(&mut self, sym: Sym, coefficient: f64) {
        if near_zero(coefficient) {
            self.cells.swap_remove(&sym);
        } else {
            self.cells.insert(sym, coefficient);
        }
    }

    /// Multiply the row by a scalar.
    pub(crate) fn multiply(&mut self, scalar: f64) {
        self.constant *= scalar;
        for coeff in self.cells.values_mut() {
            *coeff *= scalar;
        }
    }

    /// Add `multiplier · other` to this row.
    pub(crate) fn add_row(&mut self, other: &Row, multiplier: f64) {
        self.constant += other.constant * multiplier;
        for (&sym, &coeff) in &other.cells {
            self.add(sym, coeff * multiplier);
        }
    }

    /// Replace `sym` with its defining row.
    pub(crate) fn substitute(&mut self, sym: Sym, row: &Row) {
        if let Some(coeff) = self.cells.swap_remove(&sym) {
            self.add_row(row, coeff);
        }
    }

    /// Solve `basic = self` for `sym`: remove its cell and rescale so the row
    /// defines `sym` in terms of the remaining symbols.
    pub(crate) fn solve_for(&mut self, sym: Sym) {
        let coeff = self.cells.swap_remove(&sym).unwrap_or(1.0);
        self.multiply(-1.0 / coeff);
    }

    /// Change the row's subject from `old_subject` to `new_subject`.
    pub(crate) fn solve_for_symbols(&mut self, old_subject: Sym, new_subject: Sym) {
        self.insert(old_subject, -1.0);
        self.solve_for(new_subject);
    }

    /// Some pivotable symbol mentioned by the row, if any.
    pub(crate) fn any_pivotable(&self) -> Option<Sym> {
        self.cells.keys().copied().find(|s| s.is_pivotable())
    }
}

/// The tableau: rows keyed by basic symbol plus the reverse column index.
#[derive(Debug, Default)]
pub(crate) struct Tableau {
    pub(crate) rows: IndexMap<Sym, Row>,
    pub(crate) columns: IndexMap<Sym, IndexSet<Sym>>,
    pub(crate) external_rows: IndexSet<Sym>,
    pub(crate) external_parametric_vars: IndexSet<Sym>,
    pub(crate) infeasible_rows: IndexSet<Sym>,
}

impl Tableau {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn has_column(&self, sym: Sym) -> bool {
        self.columns.contains_key(&sym)
    }

    /// Record `basic = row`, indexing every mentioned symbol.
    pub(crate) fn add_row(&mut self, basic: Sym, row: Row) {
        for (&sym, _) in row.cells.iter() {
            self.columns.entry(sym).or_default().insert(basic);
            if sym.is_external() {
                self.external_parametric_vars.insert(sym);
            }
        }
        if basic.is_external() {
            self.external_rows.insert(basic);
        }
        self.rows.insert(basic, row);
    }

    /// Remove the row for `basic`, detaching it from every column it touched.
    pub(crate) fn remove_row(&mut self, basic: Sym) -> Option<Row> {
        let row = self.rows.swap_remove(&basic)?;
        for (&sym, _) in row.cells.iter() {
            if let Some(set) = self.columns.get_mut(&sym) {
                set.swap_remove(&basic);
            }
        }
        self.infeasible_rows.swap_remove(&basic);
        if basic.is_external() {
            self.external_rows.swap_remove(&basic);
        }
        Some(row)
    }

    /// Drop every cell mentioning `sym` from the tableau.
    pub(crate) fn remove_column(&mut self, sym: Sym) {
        if let Some(basics) = self.columns.swap_remove(&sym) {
            for basic in basics {
                if let Some(row) = self.rows.get_mut(&basic) {
                    row.cells.swap_remove(&sym);
                }
            }
        }
        if sym.is_external() {
            self.external_rows.swap_remove(&sym);
            self.external_parametric_vars.swap_remove(&sym);
        }
    }

    /// Replace `sym` with `expr` in every row that mentions it.
    ///
    /// Restricted basics whose constant goes negative are flagged infeasible
    /// for the next dual re-solve.
    pub(crate) fn substitute_out(&mut self, sym: Sym, expr: &Row) {
        let basics = self.columns.swap_remove(&sym).unwrap_or_default();
        for basic in basics {
            let Some(row) = self.rows.get_mut(&basic) else {
                continue;
            };
            let Some(coeff) = row.cells.swap_remove(&sym) else {
                continue;
            };
            row.constant += coeff * expr.constant;
            for (&s, &c) in expr.cells.iter() {
                let had = row.cells.contains_key(&s);
                row.add(s, c * coeff);
                let has = row.cells.contains_key(&s);
                if has && !had {
                    self.columns.entry(s).or_default().insert(basic);
                    if s.is_external() {
                        self.external_parametric_vars.insert(s);
                    }
                } else if had && !has {
                    if let Some(set) = self.columns.get_mut(&s) {
                        set.swap_remove(&basic);
                    }
                }
            }
            if basic.is_restricted() && row.constant < 0.0 {
                self.infeasible_rows.insert(basic);
            }
        }
        if sym.is_external() {
            self.external_parametric_vars.swap_remove(&sym);
        }
    }

    /// Merge `multiplier · source` into the row of `basic`, keeping the
    /// column index in lockstep.
    pub(crate) fn merge_into_row(&mut self, basic: Sym, source: &Row, multiplier: f64) {
        let Some(row) = self.rows.get_mut(&basic) else {
            return;
        };
        row.constant += source.constant * multiplier;
        for (&sym, &coeff) in source.cells.iter() {
            let had = row.cells.contains_key(&sym);
            row.add(sym, coeff * multiplier);
            let has = row.cells.contains_key(&sym);
            if has && !had {
                self.columns.entry(sym).or_default().insert(basic);
            } else if had && !has {
                if let Some(set) = self.columns.get_mut(&sym) {
                    set.swap_remove(&basic);
                }
            }
        }
    }

    /// Add `coefficient · sym` into the row of `basic`, keeping the column
    /// index in lockstep.
    pub(crate) fn add_to_row(&mut self, basic: Sym, sym: Sym, coefficient: f64) {
        let Some(row) = self.rows.get_mut(&basic) else {
            return;
        };
        let had = row.cells.contains_key(&sym);
        row.add(sym, coefficient);
        let has = row.cells.contains_key(&sym);
        if has && !had {
            self.columns.entry(sym).or_default().insert(basic);
        } else if had && !has {
            if let Some(set) = self.columns.get_mut(&sym) {
                set.swap_remove(&basic);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(constant: f64, cells: &[(Sym, f64)]) -> Row {
        let mut r = Row::new(constant);
        for &(sym, coeff) in cells {
            r.insert(sym, coeff);
        }
        r
    }

    /// The column index must list exactly the basics whose rows mention a
    /// symbol.
    fn check_lockstep(tab: &Tableau) {
        for (basic, row) in &tab.rows {
            for (sym, _) in row.cells() {
                let set = tab.columns.get(sym).expect("missing column");
                assert!(set.contains(basic), "column {} missing {}", sym, basic);
            }
        }
        for (sym, set) in &tab.columns {
            for basic in set {
                let row = tab.rows.get(basic).expect("column lists dead row");
                assert!(row.contains(*sym), "stale column entry {} -> {}", sym, basic);
            }
        }
    }

    #[test]
    fn test_add_and_remove_row() {
        let mut tab = Tableau::new();
        let x = Sym::External(0);
        let s1 = Sym::Slack(1);
        let s2 = Sym::Slack(2);

        tab.add_row(x, row(4.0, &[(s1, 1.0), (s2, -2.0)]));
        assert!(tab.has_column(s1));
        assert!(tab.external_rows.contains(&x));
        check_lockstep(&tab);

        let removed = tab.remove_row(x).unwrap();
        assert_eq!(removed.constant, 4.0);
        assert!(!tab.external_rows.contains(&x));
        assert!(tab.columns[&s1].is_empty());
        check_lockstep(&tab);
    }

    #[test]
    fn test_remove_column() {
        let mut tab = Tableau::new();
        let a = Sym::Slack(0);
        let b = Sym::Slack(1);
        let c = Sym::Slack(2);

        tab.add_row(a, row(1.0, &[(c, 1.0)]));
        tab.add_row(b, row(2.0, &[(c, -1.0)]));
        tab.remove_column(c);

        assert!(tab.rows[&a].is_constant());
        assert!(tab.rows[&b].is_constant());
        check_lockstep(&tab);
    }

    #[test]
    fn test_substitute_out_updates_columns_and_infeasibility() {
        let mut tab = Tableau::new();
        let s1 = Sym::Slack(1);
        let s2 = Sym::Slack(2);
        let s3 = Sym::Slack(3);
        let basic = Sym::Slack(0);

        tab.add_row(basic, row(1.0, &[(s1, 1.0)]));
        // s1 := -2 + s2 - s3
        let def = row(-2.0, &[(s2, 1.0), (s3, -1.0)]);
        tab.substitute_out(s1, &def);

        let r = &tab.rows[&basic];
        assert_eq!(r.constant, -1.0);
        assert_eq!(r.coefficient(s2), 1.0);
        assert_eq!(r.coefficient(s3), -1.0);
        assert!(!tab.has_column(s1));
        assert!(tab.infeasible_rows.contains(&basic));
        check_lockstep(&tab);
    }

    #[test]
    fn test_substitute_out_cancellation_drops_column_entry() {
        let mut tab = Tableau::new();
        let s1 = Sym::Slack(1);
        let s2 = Sym::Slack(2);
        let basic = Sym::Slack(0);

        // basic = s1 + s2; substituting s1 := -s2 cancels the s2 cell.
        tab.add_row(basic, row(0.0, &[(s1, 1.0), (s2, 1.0)]));
        let def = row(0.0, &[(s2, -1.0)]);
        tab.substitute_out(s1, &def);

        assert!(tab.rows[&basic].is_constant());
        assert!(!tab.columns[&s2].contains(&basic));
        check_lockstep(&tab);
    }

    #[test]
    fn test_solve_for_symbols() {
        let s1 = Sym::Slack(1);
        let s2 = Sym::Slack(2);
        // old = 10 + 2·s2  becomes  s2 = -5 + old/2
        let mut r = row(10.0, &[(s2, 2.0)]);
        r.solve_for_symbols(s1, s2);
        assert_eq!(r.constant, -5.0);
        assert_eq!(r.coefficient(s1), 0.5);
        assert!(!r.contains(s2));
    }
}
