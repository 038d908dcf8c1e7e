//! The incremental constraint solver.
//!
//! Constraints are folded into the tableau one at a time: each one becomes a
//! single row asserted equal to zero, with slack, error, and dummy symbols
//! standing in for inequality headroom, soft-constraint deviation, and removal
//! handles. A primal simplex pass restores optimality after each addition; an
//! edit session perturbs row constants in place and re-solves with a dual
//! pass, which touches only the rows an edit actually disturbed.

use indexmap::IndexMap;
use smallvec::SmallVec;

use tether_core::{
    near_zero, Constraint, ConstraintId, ConstraintKind, SolverError, Strength, Variable, EPSILON,
};

use crate::tableau::{Row, Sym, Tableau};

/// Bookkeeping for one edit-active variable.
#[derive(Debug, Clone)]
struct EditInfo {
    constraint: ConstraintId,
    plus: Sym,
    minus: Sym,
    prev_constant: f64,
    index: usize,
}

/// The result of translating a constraint into a tableau row.
struct BuiltRow {
    row: Row,
    marker: Sym,
    errors: SmallVec<[Sym; 2]>,
    plus_minus: Option<(Sym, Sym)>,
    prev_constant: f64,
}

/// An incremental solver for prioritized linear constraints.
///
/// Required constraints are always satisfied exactly; non-required ones are
/// satisfied as well as their strengths allow. Adding and removing constraints
/// and suggesting new values for edit variables re-solve incrementally rather
/// than from scratch.
#[derive(Debug)]
pub struct Solver {
    tableau: Tableau,
    objective: Sym,
    symbol_counter: usize,
    constraint_counter: usize,
    constraints: IndexMap<ConstraintId, Constraint>,
    marker_vars: IndexMap<ConstraintId, Sym>,
    error_vars: IndexMap<ConstraintId, SmallVec<[Sym; 2]>>,
    stay_error_vars: Vec<(Sym, Sym)>,
    edit_var_map: IndexMap<Variable, EditInfo>,
    edit_var_stack: Vec<usize>,
    var_values: IndexMap<usize, f64>,
    auto_solve: bool,
    needs_solving: bool,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create an empty solver.
    pub fn new() -> Self {
        let objective = Sym::Objective(0);
        let mut tableau = Tableau::new();
        tableau.add_row(objective, Row::new(0.0));
        Self {
            tableau,
            objective,
            symbol_counter: 0,
            constraint_counter: 0,
            constraints: IndexMap::new(),
            marker_vars: IndexMap::new(),
            error_vars: IndexMap::new(),
            stay_error_vars: Vec::new(),
            edit_var_map: IndexMap::new(),
            edit_var_stack: vec![0],
            var_values: IndexMap::new(),
            auto_solve: true,
            needs_solving: false,
        }
    }

    /// The current value of a variable.
    ///
    /// Values reflect the last solve or resolve; with auto-solve enabled
    /// (the default) they are current after every structural change.
    pub fn get_value(&self, var: Variable) -> f64 {
        self.var_values.get(&var.id()).copied().unwrap_or(0.0)
    }

    /// Whether the tableau mentions the variable at all.
    pub fn contains_variable(&self, var: Variable) -> bool {
        let sym = Sym::External(var.id());
        self.tableau.has_column(sym) || self.tableau.rows.contains_key(&sym)
    }

    /// The number of constraints currently in the solver.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Whether structural changes re-solve and write back immediately.
    pub fn is_auto_solve(&self) -> bool {
        self.auto_solve
    }

    /// Control automatic re-solving. Turning it off is useful while loading
    /// many constraints in a batch; call [`solve`] when done.
    ///
    /// [`solve`]: Solver::solve
    pub fn set_auto_solve(&mut self, auto_solve: bool) {
        self.auto_solve = auto_solve;
    }

    /// Add a constraint, re-establishing feasibility and optimality.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintId, SolverError> {
        if constraint.is_edit() && constraint.is_required() {
            return Err(SolverError::Internal("edit constraints must not be required"));
        }
        let id = ConstraintId(self.constraint_counter);
        self.constraint_counter += 1;

        let mut built = self.build_row(&constraint);

        match self.choose_subject(&mut built.row)? {
            Some(subject) => {
                built.row.solve_for(subject);
                if self.tableau.has_column(subject) {
                    self.tableau.substitute_out(subject, &built.row);
                }
                self.tableau.add_row(subject, built.row);
            }
            None => self.add_with_artificial_variable(built.row)?,
        }

        self.marker_vars.insert(id, built.marker);
        if !built.errors.is_empty() {
            self.error_vars.insert(id, built.errors);
        }
        if let ConstraintKind::Edit(var) = constraint.kind() {
            let (plus, minus) = built
                .plus_minus
                .ok_or(SolverError::Internal("edit constraint without error variables"))?;
            let index = self.edit_var_map.len();
            self.edit_var_map.insert(
                var,
                EditInfo {
                    constraint: id,
                    plus,
                    minus,
                    prev_constant: built.prev_constant,
                    index,
                },
            );
        }
        self.constraints.insert(id, constraint);

        self.needs_solving = true;
        if self.auto_solve {
            self.optimize(self.objective)?;
            self.set_external_variables();
        }
        Ok(id)
    }

    /// Remove a previously added constraint along with every internal symbol
    /// it introduced.
    pub fn remove_constraint(&mut self, id: ConstraintId) -> Result<(), SolverError> {
        let constraint = self
            .constraints
            .swap_remove(&id)
            .ok_or(SolverError::UnknownConstraint)?;
        self.needs_solving = true;

        // Take the constraint's penalty back out of the objective.
        let errors = self.error_vars.swap_remove(&id).unwrap_or_default();
        let obj_coeff = -constraint.strength().value() * constraint.weight();
        for &ev in &errors {
            match self.tableau.rows.get(&ev).cloned() {
                Some(row) => self.tableau.merge_into_row(self.objective, &row, obj_coeff),
                None => self.tableau.add_to_row(self.objective, ev, obj_coeff),
            }
        }

        let marker = self
            .marker_vars
            .swap_remove(&id)
            .ok_or(SolverError::Internal("constraint has no marker variable"))?;

        if !self.tableau.rows.contains_key(&marker) {
            self.pivot_marker_into_basis(marker)?;
        }
        if self.tableau.rows.contains_key(&marker) {
            self.tableau.remove_row(marker);
        }
        for &ev in &errors {
            if ev != marker {
                self.tableau.remove_column(ev);
            }
        }

        match constraint.kind() {
            ConstraintKind::Stay(_) => {
                self.stay_error_vars
                    .retain(|(plus, minus)| !errors.contains(plus) && !errors.contains(minus));
            }
            ConstraintKind::Edit(var) => {
                if let Some(info) = self.edit_var_map.swap_remove(&var) {
                    self.tableau.remove_column(info.minus);
                }
            }
            ConstraintKind::Linear => {}
        }

        if self.auto_solve {
            self.optimize(self.objective)?;
            self.set_external_variables();
        }
        Ok(())
    }

    /// Add an edit constraint on `var` so its value can be steered with
    /// [`suggest_value`]. Pass [`Strength::STRONG`] unless the edit has to
    /// compete with other strong constraints.
    ///
    /// [`suggest_value`]: Solver::suggest_value
    pub fn add_edit_var(
        &mut self,
        var: Variable,
        strength: Strength,
    ) -> Result<ConstraintId, SolverError> {
        let value = self.get_value(var);
        self.add_constraint(Constraint::edit(var, value, strength))
    }

    /// Remove the edit constraint on `var` without ending the session.
    pub fn remove_edit_var(&mut self, var: Variable) -> Result<(), SolverError> {
        let id = self
            .edit_var_map
            .get(&var)
            .map(|info| info.constraint)
            .ok_or(SolverError::Internal("variable has no edit constraint"))?;
        self.remove_constraint(id)
    }

    /// Add a stay on `var`, keeping it near its current value.
    pub fn add_stay(&mut self, var: Variable, strength: Strength) -> Result<ConstraintId, SolverError> {
        self.add_stay_with_weight(var, strength, 1.0)
    }

    /// Add a stay with an explicit weight multiplier.
    pub fn add_stay_with_weight(
        &mut self,
        var: Variable,
        strength: Strength,
        weight: f64,
    ) -> Result<ConstraintId, SolverError> {
        let value = self.get_value(var);
        self.add_constraint(Constraint::stay(var, value, strength, weight))
    }

    /// Make sure `var` is known to the solver, anchoring it with a weak stay.
    pub fn add_var(&mut self, var: Variable) -> Result<(), SolverError> {
        if !self.contains_variable(var) {
            self.add_stay(var, Strength::WEAK)?;
        }
        Ok(())
    }

    /// Require `var ≥ lower`.
    pub fn add_lower_bound(
        &mut self,
        var: Variable,
        lower: f64,
    ) -> Result<ConstraintId, SolverError> {
        self.add_constraint((var - lower).geq(0.0))
    }

    /// Require `var ≤ upper`.
    pub fn add_upper_bound(
        &mut self,
        var: Variable,
        upper: f64,
    ) -> Result<ConstraintId, SolverError> {
        self.add_constraint((var - upper).leq(0.0))
    }

    /// Require `lower ≤ var ≤ upper`.
    pub fn add_bounds(
        &mut self,
        var: Variable,
        lower: f64,
        upper: f64,
    ) -> Result<(ConstraintId, ConstraintId), SolverError> {
        Ok((
            self.add_lower_bound(var, lower)?,
            self.add_upper_bound(var, upper)?,
        ))
    }

    /// Open an edit session over the variables registered with
    /// [`add_edit_var`]. Sessions nest; each [`end_edit`] removes the edit
    /// variables added since the matching `begin_edit`.
    ///
    /// [`add_edit_var`]: Solver::add_edit_var
    /// [`end_edit`]: Solver::end_edit
    pub fn begin_edit(&mut self) -> Result<(), SolverError> {
        if self.edit_var_map.is_empty() {
            return Err(SolverError::Internal("begin_edit with no edit variables"));
        }
        self.tableau.infeasible_rows.clear();
        self.reset_stay_constants();
        self.edit_var_stack.push(self.edit_var_map.len());
        Ok(())
    }

    /// Close the innermost edit session, absorbing outstanding suggestions
    /// and removing its edit constraints.
    pub fn end_edit(&mut self) -> Result<(), SolverError> {
        if self.edit_var_map.is_empty() {
            return Err(SolverError::Internal("end_edit with no edit variables"));
        }
        self.resolve()?;
        if self.edit_var_stack.len() > 1 {
            self.edit_var_stack.pop();
        }
        let n = self.edit_var_stack.last().copied().unwrap_or(0);
        self.remove_edit_vars_to(n)
    }

    /// Record a new target value for an edit variable. The tableau is
    /// perturbed in place; call [`resolve`] to re-establish feasibility.
    ///
    /// [`resolve`]: Solver::resolve
    pub fn suggest_value(&mut self, var: Variable, value: f64) -> Result<(), SolverError> {
        let info = self.edit_var_map.get_mut(&var).ok_or(SolverError::Internal(
            "suggest_value on a variable without an edit constraint",
        ))?;
        let delta = value - info.prev_constant;
        info.prev_constant = value;
        let (plus, minus) = (info.plus, info.minus);
        self.delta_edit_constant(delta, plus, minus);
        Ok(())
    }

    /// Absorb suggested values: dual-optimize back to feasibility and write
    /// the solution out to the variables.
    pub fn resolve(&mut self) -> Result<(), SolverError> {
        self.dual_optimize()?;
        self.set_external_variables();
        self.tableau.infeasible_rows.clear();
        self.reset_stay_constants();
        Ok(())
    }

    /// Re-optimize and write back variable values if anything changed since
    /// the last solve.
    pub fn solve(&mut self) -> Result<(), SolverError> {
        if self.needs_solving {
            self.optimize(self.objective)?;
            self.set_external_variables();
        }
        Ok(())
    }

    /// One-shot convenience: edit `var` to `value` through a throwaway edit
    /// session.
    pub fn set_edited_value(&mut self, var: Variable, value: f64) -> Result<(), SolverError> {
        if !self.contains_variable(var) {
            self.var_values.insert(var.id(), value);
            return Ok(());
        }
        if near_zero(value - self.get_value(var)) {
            return Ok(());
        }
        self.add_edit_var(var, Strength::STRONG)?;
        self.begin_edit()?;
        self.suggest_value(var, value)?;
        self.end_edit()
    }

    fn new_slack(&mut self) -> Sym {
        self.symbol_counter += 1;
        Sym::Slack(self.symbol_counter)
    }

    fn new_dummy(&mut self) -> Sym {
        self.symbol_counter += 1;
        Sym::Dummy(self.symbol_counter)
    }

    fn new_objective(&mut self) -> Sym {
        self.symbol_counter += 1;
        Sym::Objective(self.symbol_counter)
    }

    /// Translate a constraint into the canonical row asserted equal to zero.
    ///
    /// Terms naming basic variables are replaced by their defining rows, so
    /// the result only mentions parametric symbols. Slack, error, and dummy
    /// symbols are minted here, and error penalties are folded into the
    /// objective.
    fn build_row(&mut self, constraint: &Constraint) -> BuiltRow {
        let expr = constraint.expression();
        let mut row = Row::new(expr.constant);
        for (&var, &coeff) in expr.terms() {
            self.var_values.entry(var.id()).or_insert(0.0);
            let sym = Sym::External(var.id());
            match self.tableau.rows.get(&sym) {
                Some(basic) => row.add_row(basic, coeff),
                None => row.add(sym, coeff),
            }
        }
        // `e ≤ 0` is the same row as `-e ≥ 0`.
        if constraint.relation() == tether_core::Relation::LessOrEqual {
            row.multiply(-1.0);
        }

        let obj_coeff = constraint.strength().value() * constraint.weight();
        let mut errors = SmallVec::new();
        let mut plus_minus = None;
        let marker;

        if constraint.is_inequality() {
            let slack = self.new_slack();
            row.insert(slack, -1.0);
            marker = slack;
            if !constraint.is_required() {
                let minus = self.new_slack();
                row.insert(minus, 1.0);
                self.tableau.add_to_row(self.objective, minus, obj_coeff);
                errors.push(minus);
            }
        } else if constraint.is_required() {
            let dummy = self.new_dummy();
            row.insert(dummy, 1.0);
            marker = dummy;
        } else {
            let plus = self.new_slack();
            let minus = self.new_slack();
            row.insert(plus, -1.0);
            row.insert(minus, 1.0);
            marker = plus;
            self.tableau.add_to_row(self.objective, plus, obj_coeff);
            self.tableau.add_to_row(self.objective, minus, obj_coeff);
            errors.push(plus);
            errors.push(minus);
            plus_minus = Some((plus, minus));
            if constraint.is_stay() {
                self.stay_error_vars.push((plus, minus));
            }
        }

        // Restricted basics need non-negative row constants.
        if row.constant < 0.0 {
            row.multiply(-1.0);
        }

        BuiltRow {
            row,
            marker,
            errors,
            plus_minus,
            prev_constant: expr.constant,
        }
    }

    /// Pick the symbol the new row will define, if any can be chosen without
    /// pivoting.
    ///
    /// Preference order: a fresh unrestricted symbol, any unrestricted
    /// symbol, a restricted non-dummy symbol with a negative coefficient that
    /// appears nowhere outside the objective. A row of nothing but dummies is
    /// either redundant (constant ~0) or an unsatisfiable requirement.
    fn choose_subject(&self, row: &mut Row) -> Result<Option<Sym>, SolverError> {
        let mut subject = None;
        let mut found_unrestricted = false;
        let mut found_new_restricted = false;

        for (&sym, &coeff) in row.cells() {
            if found_unrestricted {
                if !sym.is_restricted() && !self.tableau.has_column(sym) {
                    return Ok(Some(sym));
                }
            } else if sym.is_restricted() {
                if !found_new_restricted && !sym.is_dummy() && coeff < 0.0 {
                    let acceptable = match self.tableau.columns.get(&sym) {
                        None => true,
                        Some(col) => col.len() == 1 && col.contains(&self.objective),
                    };
                    if acceptable {
                        subject = Some(sym);
                        found_new_restricted = true;
                    }
                }
            } else {
                subject = Some(sym);
                found_unrestricted = true;
            }
        }
        if subject.is_some() {
            return Ok(subject);
        }

        let mut coeff = 0.0;
        for (&sym, &c) in row.cells() {
            if !sym.is_dummy() {
                return Ok(None);
            }
            if !self.tableau.has_column(sym) {
                subject = Some(sym);
                coeff = c;
            }
        }
        if !near_zero(row.constant) {
            return Err(SolverError::Unsatisfiable);
        }
        if coeff > 0.0 {
            row.multiply(-1.0);
        }
        Ok(subject)
    }

    /// Insert a row that accepts no direct subject by minting an artificial
    /// basic variable and driving an auxiliary objective to zero.
    ///
    /// If the auxiliary objective cannot reach zero the required constraints
    /// are inconsistent; the artificial row and column are removed again,
    /// restoring the tableau.
    fn add_with_artificial_variable(&mut self, row: Row) -> Result<(), SolverError> {
        let av = self.new_slack();
        let az = self.new_objective();

        self.tableau.add_row(az, row.clone());
        self.tableau.add_row(av, row);
        self.optimize(az)?;

        let az_constant = self
            .tableau
            .rows
            .get(&az)
            .map(|r| r.constant)
            .ok_or(SolverError::Internal("auxiliary objective row vanished"))?;
        if !near_zero(az_constant) {
            self.tableau.remove_row(az);
            if self.tableau.rows.contains_key(&av) {
                self.tableau.remove_row(av);
            }
            self.tableau.remove_column(av);
            return Err(SolverError::Unsatisfiable);
        }

        if let Some(av_row) = self.tableau.rows.get(&av) {
            if av_row.is_constant() {
                self.tableau.remove_row(av);
                self.tableau.remove_row(az);
                return Ok(());
            }
            let entering = av_row
                .any_pivotable()
                .ok_or(SolverError::Internal("artificial row has no pivotable variable"))?;
            self.pivot(entering, av)?;
        }
        self.tableau.remove_column(av);
        self.tableau.remove_row(az);
        Ok(())
    }

    /// Minimize the given objective row with the primal simplex.
    fn optimize(&mut self, objective: Sym) -> Result<(), SolverError> {
        loop {
            let z_row = self
                .tableau
                .rows
                .get(&objective)
                .ok_or(SolverError::Internal("objective row missing"))?;

            // Entering variable: the pivotable symbol with the most negative
            // objective coefficient.
            let mut entering = None;
            let mut best = -EPSILON;
            for (&sym, &coeff) in z_row.cells() {
                if sym.is_pivotable() && coeff < best {
                    best = coeff;
                    entering = Some(sym);
                }
            }
            let Some(entering) = entering else {
                return Ok(());
            };

            // Leaving row: minimum ratio over the entering symbol's column.
            let mut exit = None;
            let mut min_ratio = f64::MAX;
            if let Some(col) = self.tableau.columns.get(&entering) {
                for &basic in col {
                    if !basic.is_pivotable() {
                        continue;
                    }
                    let Some(row) = self.tableau.rows.get(&basic) else {
                        continue;
                    };
                    let coeff = row.coefficient(entering);
                    if coeff < 0.0 {
                        let ratio = -row.constant / coeff;
                        if ratio < min_ratio {
                            min_ratio = ratio;
                            exit = Some(basic);
                        }
                    }
                }
            }
            let Some(exit) = exit else {
                return Err(SolverError::Internal("objective is unbounded"));
            };
            self.pivot(entering, exit)?;
        }
    }

    /// Re-establish feasibility after row constants were perturbed, using the
    /// dual simplex over the infeasible-row set.
    fn dual_optimize(&mut self) -> Result<(), SolverError> {
        while let Some(exit) = self.tableau.infeasible_rows.pop() {
            let Some(row) = self.tableau.rows.get(&exit) else {
                continue;
            };
            if row.constant >= 0.0 {
                continue;
            }
            let z_row = self
                .tableau
                .rows
                .get(&self.objective)
                .ok_or(SolverError::Internal("objective row missing"))?;

            let mut entering = None;
            let mut min_ratio = f64::MAX;
            for (&sym, &coeff) in row.cells() {
                if coeff > 0.0 && sym.is_pivotable() {
                    let ratio = z_row.coefficient(sym) / coeff;
                    if ratio < min_ratio {
                        min_ratio = ratio;
                        entering = Some(sym);
                    }
                }
            }
            let entering = entering.ok_or(SolverError::Internal(
                "dual optimize found no entering variable",
            ))?;
            self.pivot(entering, exit)?;
        }
        Ok(())
    }

    /// Swap `entering` into the basis in place of `exit`.
    fn pivot(&mut self, entering: Sym, exit: Sym) -> Result<(), SolverError> {
        let mut row = self
            .tableau
            .remove_row(exit)
            .ok_or(SolverError::Internal("pivot exit row missing"))?;
        if !row.contains(entering) {
            return Err(SolverError::Internal("entering variable absent from pivot row"));
        }
        row.solve_for_symbols(exit, entering);
        self.tableau.substitute_out(entering, &row);
        self.tableau.add_row(entering, row);
        Ok(())
    }

    /// Shift suggested-value delta through the rows holding an edit's error
    /// pair, flagging any restricted row driven negative.
    fn delta_edit_constant(&mut self, delta: f64, plus: Sym, minus: Sym) {
        if let Some(row) = self.tableau.rows.get_mut(&plus) {
            row.constant += delta;
            if row.constant < 0.0 {
                self.tableau.infeasible_rows.insert(plus);
            }
            return;
        }
        if let Some(row) = self.tableau.rows.get_mut(&minus) {
            row.constant -= delta;
            if row.constant < 0.0 {
                self.tableau.infeasible_rows.insert(minus);
            }
            return;
        }
        // Both parametric: shift every row that mentions the minus symbol.
        let Some(col) = self.tableau.columns.get(&minus) else {
            return;
        };
        for &basic in col {
            let Some(row) = self.tableau.rows.get_mut(&basic) else {
                continue;
            };
            let coeff = row.coefficient(minus);
            row.constant += coeff * delta;
            if basic.is_restricted() && row.constant < 0.0 {
                self.tableau.infeasible_rows.insert(basic);
            }
        }
    }

    /// Zero the constant of whichever error variable of each stay pair is
    /// basic; the parametric one already has value zero.
    fn reset_stay_constants(&mut self) {
        for &(plus, minus) in &self.stay_error_vars {
            if let Some(row) = self.tableau.rows.get_mut(&plus) {
                row.constant = 0.0;
            } else if let Some(row) = self.tableau.rows.get_mut(&minus) {
                row.constant = 0.0;
            }
        }
    }

    /// Bring a parametric marker into the basis so its row can be dropped.
    ///
    /// Preference: a restricted row with a negative marker coefficient by
    /// smallest ratio, then a restricted row with a positive coefficient,
    /// then any row in the marker's column.
    fn pivot_marker_into_basis(&mut self, marker: Sym) -> Result<(), SolverError> {
        let Some(col) = self.tableau.columns.get(&marker).cloned() else {
            return Ok(());
        };

        let mut exit = None;
        let mut min_ratio = 0.0;
        for &basic in &col {
            if !basic.is_restricted() {
                continue;
            }
            let Some(row) = self.tableau.rows.get(&basic) else {
                continue;
            };
            let coeff = row.coefficient(marker);
            if coeff >= 0.0 {
                continue;
            }
            let ratio = -row.constant / coeff;
            let better = match exit {
                None => true,
                Some(e) => {
                    ratio < min_ratio || (near_zero(ratio - min_ratio) && basic < e)
                }
            };
            if better {
                min_ratio = ratio;
                exit = Some(basic);
            }
        }
        if exit.is_none() {
            for &basic in &col {
                if !basic.is_restricted() {
                    continue;
                }
                let Some(row) = self.tableau.rows.get(&basic) else {
                    continue;
                };
                let coeff = row.coefficient(marker);
                let ratio = row.constant / coeff;
                if exit.is_none() || ratio < min_ratio {
                    min_ratio = ratio;
                    exit = Some(basic);
                }
            }
        }
        if exit.is_none() {
            if col.is_empty() {
                self.tableau.remove_column(marker);
                return Ok(());
            }
            exit = col.iter().copied().find(|&basic| basic != self.objective);
        }
        if let Some(exit) = exit {
            self.pivot(marker, exit)?;
        }
        Ok(())
    }

    /// Drop the edit constraints registered after the session boundary `n`.
    fn remove_edit_vars_to(&mut self, n: usize) -> Result<(), SolverError> {
        let doomed: Vec<ConstraintId> = self
            .edit_var_map
            .values()
            .filter(|info| info.index >= n)
            .map(|info| info.constraint)
            .collect();
        for id in doomed {
            self.remove_constraint(id)?;
        }
        Ok(())
    }

    /// Write the solution out: parametric externals are zero, basic externals
    /// take their row constants.
    fn set_external_variables(&mut self) {
        for &sym in &self.tableau.external_parametric_vars {
            if self.tableau.rows.contains_key(&sym) {
                continue;
            }
            if let Sym::External(id) = sym {
                self.var_values.insert(id, 0.0);
            }
        }
        for &sym in &self.tableau.external_rows {
            if let (Sym::External(id), Some(row)) = (sym, self.tableau.rows.get(&sym)) {
                self.var_values.insert(id, row.constant);
            }
        }
        self.needs_solving = false;
    }
}
