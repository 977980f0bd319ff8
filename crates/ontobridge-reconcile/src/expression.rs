//! Expression and restriction copier, and the restriction pass helpers.

use crate::error::Result;
use crate::report::SkipReason;
use crate::session::Session;
use ontobridge_graph::{Condition, LogicExpression, Operand, Restriction};

impl Session<'_> {
    /// Rebuild an expression tree in the target, keeping its combinators.
    /// Returns `None` when filtering emptied an expression that had operands.
    pub fn copy_expression(&mut self, expression: &LogicExpression) -> Result<Option<LogicExpression>> {
        let mut copy = LogicExpression::new(expression.kind);
        for operand in &expression.operands {
            match operand {
                Operand::Expression(inner) => {
                    if let Some(inner) = self.copy_expression(inner)? {
                        copy.push(Operand::Expression(inner));
                    }
                }
                Operand::Restriction(restriction) => {
                    if let Some(restriction) = self.copy_restriction(restriction)? {
                        copy.push(Operand::Restriction(restriction));
                    }
                }
                Operand::Class(class) => {
                    let resolved = if self.policy.drop_unresolved {
                        self.existing_counterpart(class)
                    } else {
                        self.copy_class(class)?
                    };
                    match resolved {
                        Some(target) => copy.push(Operand::Class(target)),
                        None => self.skip(class, SkipReason::UnresolvedReference),
                    }
                }
                Operand::Value(value) => copy.push(Operand::Value(value.clone())),
            }
        }
        if copy.is_empty() && !expression.is_empty() {
            return Ok(None);
        }
        Ok(Some(copy))
    }

    /// Copy a restriction: its property through the property copier, its
    /// filler through the expression copier.
    pub fn copy_restriction(&mut self, restriction: &Restriction) -> Result<Option<Restriction>> {
        let parameter = match self.copy_expression(&restriction.parameter)? {
            Some(parameter) => parameter,
            None => {
                self.skip(&restriction.property, SkipReason::VacuousRestriction);
                return Ok(None);
            }
        };
        let Some(property) = self.copy_property(&restriction.property)? else {
            return Ok(None);
        };
        Ok(Some(Restriction::new(restriction.kind, property, parameter)))
    }

    /// Copy a class condition. Skips are recorded here, so `None` needs no
    /// further reporting.
    pub(crate) fn copy_condition(&mut self, subject: &str, condition: &Condition) -> Result<Option<Condition>> {
        Ok(match condition {
            Condition::Restriction(r) => self.copy_restriction(r)?.map(Condition::Restriction),
            Condition::Expression(e) => match self.copy_expression(e)? {
                Some(copy) => Some(Condition::Expression(copy)),
                None => {
                    self.skip(subject, SkipReason::VacuousRestriction);
                    None
                }
            },
        })
    }

    fn already_carries(&self, class: &str, condition: &Condition) -> bool {
        match condition {
            Condition::Restriction(r) => self
                .target
                .restrictions_on(class, &r.property)
                .iter()
                .any(|existing| existing.parameter == r.parameter),
            Condition::Expression(_) => {
                self.target.equivalent_conditions(class).contains(condition)
                    || self.target.necessary_conditions(class).contains(condition)
            }
        }
    }

    /// Attach copies of `source_class`'s equivalent and necessary conditions
    /// to `target_class`.
    pub fn copy_restrictions_onto(&mut self, source_class: &str, target_class: &str) -> Result<()> {
        let conditions = self
            .source
            .equivalent_conditions(source_class)
            .into_iter()
            .map(|c| (true, c))
            .chain(
                self.source
                    .necessary_conditions(source_class)
                    .into_iter()
                    .map(|c| (false, c)),
            )
            .collect::<Vec<_>>();

        for (equivalent, condition) in conditions {
            let Some(copy) = self.copy_condition(source_class, &condition)? else {
                continue;
            };
            if self.policy.dedupe_restrictions && self.already_carries(target_class, &copy) {
                self.skip(target_class, SkipReason::DuplicateRestriction);
                continue;
            }
            let added = if equivalent {
                self.target.add_equivalent_condition(target_class, copy)?
            } else {
                self.target.add_necessary_condition(target_class, copy)?
            };
            if added {
                self.ctx.report.restrictions_attached += 1;
            }
        }
        Ok(())
    }

    /// Restriction pass for one source class in clone mode. Classes whose
    /// copy the target does not own are left alone.
    pub fn copy_restrictions(&mut self, source_class: &str) -> Result<()> {
        let Some(target_class) = self.copy_class(source_class)? else {
            return Ok(());
        };
        if !self.target.owns(&target_class) {
            self.skip(&target_class, SkipReason::ForeignClass);
            return Ok(());
        }
        self.copy_restrictions_onto(source_class, &target_class)
    }
}
