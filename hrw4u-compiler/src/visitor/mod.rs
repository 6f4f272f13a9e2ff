//! Forward code generator
//!
//! Walks an hrw4u [`Program`] and emits native header-rewrite lines.
//!
//! Each section opens a ruleset with its hook condition. Every
//! conditional, and the first statement after a conditional, starts a new
//! ruleset for the same hook. Identifiers resolve against the declared
//! variables first and the symbol tables second.
//!
//! Errors are caught at statement granularity: a statement that fails
//! emits nothing, the error goes to the [`ErrorCollector`], and the walk
//! continues unless the collector is fail-fast.

pub mod emitter;
pub mod interpolate;

use crate::diagnostic::SourceFile;
use crate::parser::ast::*;
use crate::parser::lexer::Location;
use emitter::Emitter;
use hrw4u_core::{
    CollectedError, CondState, ContextType, Error, ErrorCollector, ErrorMode, Halt, Modifier,
    OperatorState, SectionContext, SectionType, Settings, SuggestionEngine, SymbolTables,
    VariableTable,
};
use hrw4u_core::tables::{ValueType, PLAIN_MODIFIERS, TEXT_MODIFIERS};
use interpolate::{interpolate, Piece};
use tracing::debug;

/// Result of a visit step: `Err(Halt)` unwinds a fail-fast pass
type Flow<T = ()> = Result<T, Halt>;

/// A resolution failure not yet turned into a diagnostic
#[derive(Debug)]
struct Fault {
    span: Location,
    error: Error,
    context: ContextType,
    /// Token to base suggestions on
    symbol: Option<String>,
}

impl Fault {
    fn new(span: Location, error: Error, context: ContextType) -> Self {
        Self {
            span,
            error,
            context,
            symbol: None,
        }
    }

    fn symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(symbol.to_string());
        self
    }
}

/// Output of a forward pass
#[derive(Debug, Clone)]
pub struct Generated {
    pub lines: Vec<String>,
    pub errors: Vec<CollectedError>,
    pub vars: VariableTable,
}

impl Generated {
    /// Lines joined with newlines, ending in one
    pub fn text(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// The forward visitor
pub struct Visitor<'a> {
    tables: &'a SymbolTables,
    settings: &'a Settings,
    file: &'a SourceFile<'a>,
    collector: ErrorCollector,
    section: SectionContext,
    vars: VariableTable,
    emitter: Emitter,
    hook_seen: bool,
    vars_seen: bool,
}

impl<'a> Visitor<'a> {
    pub fn new(
        tables: &'a SymbolTables,
        settings: &'a Settings,
        file: &'a SourceFile<'a>,
        collector: ErrorCollector,
    ) -> Self {
        Self {
            tables,
            settings,
            file,
            collector,
            section: SectionContext::new(),
            vars: VariableTable::new(),
            emitter: Emitter::new(settings.output.indent),
            hook_seen: false,
            vars_seen: false,
        }
    }

    /// Convenience constructor with an empty collector
    pub fn with_mode(
        tables: &'a SymbolTables,
        settings: &'a Settings,
        file: &'a SourceFile<'a>,
        mode: ErrorMode,
    ) -> Self {
        Self::new(tables, settings, file, ErrorCollector::new(mode))
    }

    pub fn visit(mut self, program: &Program) -> Generated {
        if self.visit_program(program).is_err() {
            debug!("🛑 stopping at first error");
        }
        Generated {
            lines: self.emitter.finish(),
            errors: self.collector.into_errors(),
            vars: self.vars,
        }
    }

    // ========================================
    // Program and sections
    // ========================================

    fn visit_program(&mut self, program: &Program) -> Flow {
        debug!("visit_program: {} section(s)", program.sections.len());
        for section in &program.sections {
            self.visit_section(section)?;
        }
        Ok(())
    }

    fn visit_section(&mut self, section: &Node<Section>) -> Flow {
        let name = &section.inner.name;
        match &section.inner.body {
            SectionBody::Vars(decls) => self.visit_vars(name, decls),
            SectionBody::Items(items) => {
                let section_type = match SectionType::from_name(&name.inner) {
                    Ok(SectionType::Vars) | Err(_) => {
                        let error = Error::UnknownSection(name.inner.clone());
                        return self.report(Fault::new(name.span, error, ContextType::Unrestricted));
                    }
                    Ok(s) => s,
                };
                self.visit_items(section_type, items)
            }
        }
    }

    fn visit_vars(&mut self, name: &Node<String>, decls: &[Node<VarDecl>]) -> Flow {
        if self.hook_seen {
            let error = Error::Variable("VARS must come before any hook section".to_string());
            return self.report(Fault::new(name.span, error, ContextType::Unrestricted));
        }
        if self.vars_seen {
            let error = Error::Variable("only one VARS section is allowed".to_string());
            return self.report(Fault::new(name.span, error, ContextType::Unrestricted));
        }
        self.vars_seen = true;

        for decl in decls {
            let d = &decl.inner;
            if let Err(error) = self.vars.declare(&d.name.inner, &d.ty.inner, d.slot) {
                self.report(Fault::new(decl.span, error, ContextType::Unrestricted))?;
            }
        }
        Ok(())
    }

    fn visit_items(&mut self, section: SectionType, items: &[Node<SectionItem>]) -> Flow {
        self.section.exit();
        if let Err(error) = self.section.enter(section) {
            return self.report(Fault::new(Location::default(), error, ContextType::Unrestricted));
        }
        self.hook_seen = true;

        let hook = section.hook().unwrap_or_default();
        debug!("`{}' -> `{}'", section, hook);

        let mut in_statement_block = false;
        // Marks before the current ruleset's separator and after its hook line
        let mut ruleset = (0, 0);
        let mut result = Ok(());
        for item in items {
            let conditional = matches!(item.inner, SectionItem::Conditional(_));
            if conditional || !in_statement_block {
                let start = self.emitter.mark();
                if !self.emitter.is_empty() {
                    self.emitter.blank();
                }
                self.emitter.line(&format!("cond %{{{}}} [AND]", hook));
                ruleset = (start, self.emitter.mark());
            }

            result = match &item.inner {
                SectionItem::Conditional(c) => {
                    in_statement_block = false;
                    match self.visit_conditional(c) {
                        Ok(true) => Ok(()),
                        Ok(false) => {
                            self.emitter.rollback(ruleset.1);
                            Ok(())
                        }
                        Err(halt) => Err(halt),
                    }
                }
                SectionItem::Statement(s) => {
                    in_statement_block = true;
                    self.emitter.stmt_indent += 1;
                    let r = self.visit_statement(item.span, s);
                    self.emitter.stmt_indent -= 1;
                    r
                }
            };

            if self.emitter.mark() == ruleset.1 {
                debug!("dropping empty ruleset for `{}'", hook);
                self.emitter.rollback(ruleset.0);
                in_statement_block = false;
            }
            if result.is_err() {
                break;
            }
        }

        self.section.exit();
        result
    }

    // ========================================
    // Conditionals
    // ========================================

    /// `Ok(false)` when a branch condition failed to resolve. The blocks are
    /// still visited so their errors are collected, but the caller drops
    /// the whole conditional since its blocks would lose their guard.
    fn visit_conditional(&mut self, conditional: &Conditional) -> Flow<bool> {
        let mut resolved = true;
        for (idx, branch) in conditional.branches.iter().enumerate() {
            if idx == 0 {
                resolved &= self.visit_condition(&branch.condition)?;
                self.visit_block(&branch.block)?;
                continue;
            }

            self.emitter.line("elif");
            self.emitter.stmt_indent += 1;
            self.emitter.cond_indent += 1;
            let result = self.visit_condition(&branch.condition).and_then(|ok| {
                self.visit_block(&branch.block)?;
                Ok(ok)
            });
            self.emitter.stmt_indent -= 1;
            self.emitter.cond_indent -= 1;
            resolved &= result?;
        }

        if let Some(block) = &conditional.otherwise {
            self.emitter.line("else");
            self.visit_block(block)?;
        }
        Ok(resolved)
    }

    fn visit_block(&mut self, block: &Node<Block>) -> Flow {
        self.emitter.stmt_indent += 1;
        let mut result = Ok(());
        for statement in &block.inner {
            result = self.visit_statement(statement.span, &statement.inner);
            if result.is_err() {
                break;
            }
        }
        self.emitter.stmt_indent -= 1;
        result
    }

    /// A whole `if`/`elif` condition; on any error its lines are dropped
    /// and `false` is returned
    fn visit_condition(&mut self, expr: &Node<Expr>) -> Flow<bool> {
        let mark = self.emitter.mark();
        let before = self.collector.len();
        self.emit_expr(expr, true, false)?;
        self.emitter.flush();
        if self.collector.len() > before {
            self.emitter.rollback(mark);
            return Ok(false);
        }
        Ok(true)
    }

    // ========================================
    // Expressions
    // ========================================

    fn emit_expr(&mut self, expr: &Node<Expr>, last: bool, negate: bool) -> Flow {
        match &expr.inner {
            Expr::Or(left, right) => {
                debug!("`OR' detected");
                self.emit_expr(left, false, false)?;
                if let Some(q) = self.emitter.queued_mut() {
                    q.state.or = true;
                }
                self.emitter.flush();
                self.emit_expr(right, last, false)
            }
            Expr::And(left, right) => {
                debug!("`AND' detected");
                self.emit_expr(left, false, false)?;
                if let Some(q) = self.emitter.queued_mut() {
                    q.state.or = false;
                }
                self.emitter.flush();
                self.emit_expr(right, last, false)
            }
            Expr::Not(inner) => self.emit_expr(inner, last, !negate),
            Expr::Group(inner) => {
                debug!("GROUP-START");
                self.emitter.flush();
                self.emitter.line("cond %{GROUP}");
                self.emitter.cond_indent += 1;
                let result = self.emit_expr(inner, true, false);
                self.emitter.flush();
                self.emitter.cond_indent -= 1;
                result?;
                let state = CondState {
                    not: negate,
                    last,
                    ..CondState::new()
                };
                self.emitter.queue("cond %{GROUP:END}".to_string(), state);
                Ok(())
            }
            Expr::Compare(comparison) => match self.render_comparison(comparison) {
                Ok((text, mut state)) => {
                    state.not ^= negate;
                    state.last = last;
                    debug!("comparison: {}", text);
                    self.emitter.queue(format!("cond {}", text), state);
                    Ok(())
                }
                Err(fault) => self.report(fault),
            },
            Expr::Call(call) => match self.render_function(call) {
                Ok(text) => {
                    self.queue_plain(text, last, negate);
                    Ok(())
                }
                Err(fault) => self.report(fault),
            },
            Expr::Bool(value) => {
                let text = if *value { "%{TRUE}" } else { "%{FALSE}" };
                self.queue_plain(text.to_string(), last, negate);
                Ok(())
            }
            Expr::Ident(name) => match self.resolve_bare(name, expr.span) {
                Ok((text, implicit)) => {
                    debug!(
                        "{} comparison: {} negate={}",
                        if implicit { "implicit" } else { "explicit" },
                        text,
                        negate
                    );
                    if implicit {
                        self.queue_plain(format!("{} =\"\"", text), last, !negate);
                    } else {
                        self.queue_plain(text, last, negate);
                    }
                    Ok(())
                }
                Err(fault) => self.report(fault),
            },
        }
    }

    fn queue_plain(&mut self, text: String, last: bool, not: bool) {
        let state = CondState {
            not,
            last,
            ..CondState::new()
        };
        self.emitter.queue(format!("cond {}", text), state);
    }

    /// A bare identifier as a condition: `(native text, implicit "" check)`
    fn resolve_bare(&self, name: &str, span: Location) -> Result<(String, bool), Fault> {
        if let Some(var) = self.vars.get(name) {
            return Ok((var.as_cond(), false));
        }
        let resolved = self
            .tables
            .resolve_condition(name, &self.section)
            .map_err(|e| Fault::new(span, e, ContextType::Condition).symbol(name))?;
        let implicit = resolved.entry.value == ValueType::String;
        Ok((resolved.as_cond(), implicit))
    }

    /// Left side of a comparison, with the modifiers it accepts
    fn resolve_subject(&self, name: &str) -> hrw4u_core::Result<(String, &'static [Modifier])> {
        if let Some(var) = self.vars.get(name) {
            return Ok((var.as_cond(), PLAIN_MODIFIERS));
        }
        let resolved = self.tables.resolve_condition(name, &self.section)?;
        Ok((resolved.as_cond(), resolved.entry.modifiers))
    }

    /// Variable or condition symbol rendered as `%{..}`
    fn resolve_symbol(&self, name: &str) -> hrw4u_core::Result<String> {
        if let Some(var) = self.vars.get(name) {
            return Ok(var.as_cond());
        }
        Ok(self.tables.resolve_condition(name, &self.section)?.as_cond())
    }

    fn render_comparison(&self, cmp: &Comparison) -> Result<(String, CondState), Fault> {
        let (lhs, allowed) = match &cmp.lhs.inner {
            Operand::Ident(name) => self
                .resolve_subject(name)
                .map_err(|e| Fault::new(cmp.lhs.span, e, ContextType::Condition).symbol(name))?,
            Operand::Call(call) => {
                let allowed = self
                    .tables
                    .resolve_function(&call.name.inner, &self.section)
                    .map_or(TEXT_MODIFIERS, |entry| entry.modifiers);
                (self.render_function(call)?, allowed)
            }
        };

        let rhs_span = cmp.rhs.span;
        let operand = match (cmp.op, &cmp.rhs.inner) {
            (CompareOp::Eq | CompareOp::Ne, Rhs::Value(v)) => format!("={}", self.render_operand(v, rhs_span)?),
            (CompareOp::Gt, Rhs::Value(v)) => format!(">{}", self.render_operand(v, rhs_span)?),
            (CompareOp::Lt, Rhs::Value(v)) => format!("<{}", self.render_operand(v, rhs_span)?),
            (CompareOp::Match | CompareOp::NotMatch, Rhs::Regex(re)) => re.clone(),
            (CompareOp::In, Rhs::Set(values)) => {
                let inner: Vec<String> = values.iter().map(|v| v.inner.text()).collect();
                format!("({})", inner.join(","))
            }
            (CompareOp::In, Rhs::IpRange(ranges)) => {
                let inner: Vec<&str> = ranges.iter().map(|r| r.inner.as_str()).collect();
                format!("{{{}}}", inner.join(","))
            }
            _ => {
                let error = Error::Semantic("invalid comparison".to_string());
                return Err(Fault::new(rhs_span, error, ContextType::Unrestricted));
            }
        };

        let mut state = CondState::new();
        for token in &cmp.modifiers {
            let modifier = Modifier::classify(&token.inner)
                .map_err(|e| Fault::new(token.span, e, ContextType::Unrestricted))?;
            if !modifier.allowed_in_with() {
                let error = Error::ModifierNotAllowed {
                    modifier: modifier.to_string(),
                    target: "a comparison".to_string(),
                };
                return Err(Fault::new(token.span, error, ContextType::Unrestricted));
            }
            if !allowed.contains(&modifier) {
                let error = Error::ModifierNotAllowed {
                    modifier: modifier.to_string(),
                    target: match &cmp.lhs.inner {
                        Operand::Ident(name) => format!("'{}'", name),
                        Operand::Call(call) => format!("'{}()'", call.name.inner),
                    },
                };
                return Err(Fault::new(token.span, error, ContextType::Unrestricted));
            }
            state
                .apply(modifier)
                .map_err(|e| Fault::new(token.span, e, ContextType::Unrestricted))?;
        }
        state.not = cmp.op.negated();

        Ok((format!("{} {}", lhs, operand), state))
    }

    /// Right-hand side of `==`, `>` and `<`
    fn render_operand(&self, value: &Value, span: Location) -> Result<String, Fault> {
        match value {
            Value::Ident(name) => self
                .resolve_symbol(name)
                .map_err(|e| Fault::new(span, e, ContextType::Condition).symbol(name)),
            other => Ok(other.text()),
        }
    }

    /// `%{TAG}` or `%{TAG:arg,..}` for a condition function
    fn render_function(&self, call: &Call) -> Result<String, Fault> {
        let name = &call.name;
        let entry = self
            .tables
            .resolve_function(&name.inner, &self.section)
            .map_err(|e| Fault::new(name.span, e, ContextType::Condition).symbol(&name.inner))?;
        if !entry.accepts_args(call.args.len()) {
            let error = Error::InvalidArity {
                symbol: name.inner.clone(),
                expected: entry.arity(),
                got: call.args.len(),
            };
            return Err(Fault::new(name.span, error, ContextType::Condition));
        }

        let args: Vec<String> = call.args.iter().map(|a| strip_quotes(&a.inner.text())).collect();
        debug!("function: {}({})", name.inner, args.join(", "));
        Ok(render_call(entry.tag, &args))
    }

    // ========================================
    // Statements
    // ========================================

    fn visit_statement(&mut self, span: Location, statement: &Statement) -> Flow {
        match self.render_statement(span, statement) {
            Ok(line) => {
                self.emitter.statement(&line);
                Ok(())
            }
            Err(fault) => self.report(fault),
        }
    }

    fn render_statement(&self, span: Location, statement: &Statement) -> Result<String, Fault> {
        match statement {
            Statement::Break => {
                debug!("BREAK");
                Ok("no-op [L]".to_string())
            }
            Statement::Call { call, modifiers } => self.render_statement_call(call, modifiers),
            Statement::Assign {
                target,
                op,
                value,
                modifiers,
            } => self.render_assignment(target, *op, value, modifiers),
            Statement::Bare { name } => {
                debug!("standalone op: {}", name.inner);
                let entry = self
                    .tables
                    .resolve_statement(&name.inner, &self.section)
                    .map_err(|e| Fault::new(name.span, e, ContextType::Operator).symbol(&name.inner))?;
                if entry.min_args > 0 {
                    let error = Error::Semantic(format!("'{}' requires an argument", name.inner));
                    return Err(Fault::new(span, error, ContextType::Operator));
                }
                Ok(match entry.payload {
                    Some(payload) => format!("{} {}", entry.tag, payload),
                    None => entry.tag.to_string(),
                })
            }
        }
    }

    fn render_statement_call(&self, call: &Call, modifiers: &[Node<String>]) -> Result<String, Fault> {
        let name = &call.name;
        let entry = self
            .tables
            .resolve_statement(&name.inner, &self.section)
            .map_err(|e| Fault::new(name.span, e, ContextType::Operator).symbol(&name.inner))?;
        if !entry.accepts_args(call.args.len()) {
            let error = Error::InvalidArity {
                symbol: name.inner.clone(),
                expected: entry.arity(),
                got: call.args.len(),
            };
            return Err(Fault::new(name.span, error, ContextType::Operator));
        }

        let mut state = operator_state(modifiers)?;
        if entry.key == "keep_query" {
            state.inv = true;
        }

        let mut parts = vec![entry.tag.to_string()];
        parts.extend(entry.payload.map(str::to_string));
        for arg in &call.args {
            parts.push(match &arg.inner {
                Value::Str(raw) => self.interpolate(raw, arg.span)?,
                other => other.text(),
            });
        }
        Ok(format!("{}{}", parts.join(" "), state.render()))
    }

    fn render_assignment(
        &self,
        target: &Node<String>,
        op: AssignOp,
        value: &Node<Value>,
        modifiers: &[Node<String>],
    ) -> Result<String, Fault> {
        let state = operator_state(modifiers)?;

        if let Some(var) = self.vars.get(&target.inner) {
            if op == AssignOp::Append {
                let error = Error::Semantic(format!("'+=' is not supported for variable '{}'", target.inner));
                return Err(Fault::new(target.span, error, ContextType::Operator));
            }
            let rendered = self.render_value(value)?;
            debug!("assignment: {} = {}", target.inner, rendered);
            return Ok(format!("{} {} {}{}", var.ty.operator(), var.slot, rendered, state.render()));
        }

        let resolved = self
            .tables
            .resolve_operator(&target.inner, &self.section)
            .map_err(|e| Fault::new(target.span, e, ContextType::Operator).symbol(&target.inner))?;
        let entry = resolved.entry;

        let remove = op == AssignOp::Set && value.inner.is_empty_string() && entry.family.is_some();
        let command = match (op, entry.family) {
            (AssignOp::Append, Some(family)) => family.add,
            (AssignOp::Append, None) => None,
            (AssignOp::Set, Some(family)) if remove => Some(family.rm),
            (AssignOp::Set, _) => Some(entry.tag),
        }
        .ok_or_else(|| {
            let error = Error::Semantic(format!("'+=' is not supported for '{}'", target.inner));
            Fault::new(target.span, error, ContextType::Operator)
        })?;

        let mut parts = vec![command.to_string()];
        parts.extend(entry.payload.map(str::to_string));
        parts.extend(resolved.suffix.clone());
        if !remove {
            parts.push(self.render_value(value)?);
        }
        debug!("assignment: {} -> {}", target.inner, parts.join(" "));
        Ok(format!("{}{}", parts.join(" "), state.render()))
    }

    /// Right-hand side of an assignment
    fn render_value(&self, value: &Node<Value>) -> Result<String, Fault> {
        match &value.inner {
            Value::Str(raw) => self.interpolate(raw, value.span),
            Value::Ident(name) => self
                .resolve_symbol(name)
                .map_err(|e| Fault::new(value.span, e, ContextType::Condition).symbol(name)),
            other => Ok(other.text()),
        }
    }

    fn interpolate(&self, raw: &str, span: Location) -> Result<String, Fault> {
        let mut failed: Option<String> = None;
        let out = interpolate(raw, |piece| {
            let result = match &piece {
                Piece::Symbol(name) => self.resolve_symbol(name),
                Piece::Call(name, args) => self.interpolated_call(name, args),
            };
            if result.is_err() {
                failed = Some(match piece {
                    Piece::Symbol(name) | Piece::Call(name, _) => name.to_string(),
                });
            }
            result
        });
        out.map_err(|e| {
            let fault = Fault::new(span, e, ContextType::Condition);
            match failed {
                Some(symbol) => fault.symbol(&symbol),
                None => fault,
            }
        })
    }

    fn interpolated_call(&self, name: &str, args: &[&str]) -> hrw4u_core::Result<String> {
        let entry = self.tables.resolve_function(name, &self.section)?;
        if !entry.accepts_args(args.len()) {
            return Err(Error::InvalidArity {
                symbol: name.to_string(),
                expected: entry.arity(),
                got: args.len(),
            });
        }
        let args: Vec<String> = args.iter().map(|a| strip_quotes(a)).collect();
        Ok(render_call(entry.tag, &args))
    }

    // ========================================
    // Errors
    // ========================================

    fn report(&mut self, fault: Fault) -> Flow {
        let suggestions = match (&fault.error, &fault.symbol) {
            (
                Error::UnknownSymbol(_) | Error::InvalidSuffix { .. } | Error::SectionRestriction { .. },
                Some(symbol),
            ) => {
                let engine = SuggestionEngine::new(self.tables, self.settings.suggestions.clone());
                let declared = self.vars.names();
                engine.get_suggestions(symbol, fault.context, self.section.current(), &declared)
            }
            _ => Vec::new(),
        };

        let error = self.file.error(
            fault.span.range(),
            fault.error.to_string(),
            fault.error.kind(),
            suggestions,
        );
        self.collector.add_error(error)
    }
}

fn operator_state(modifiers: &[Node<String>]) -> Result<OperatorState, Fault> {
    let mut state = OperatorState::new();
    for token in modifiers {
        state
            .add_modifier(&token.inner)
            .map_err(|e| Fault::new(token.span, e, ContextType::Unrestricted))?;
    }
    Ok(state)
}

fn render_call(tag: &str, args: &[String]) -> String {
    if args.is_empty() {
        format!("%{{{}}}", tag)
    } else {
        format!("%{{{}:{}}}", tag, args.join(","))
    }
}

fn strip_quotes(text: &str) -> String {
    text.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(text)
        .to_string()
}
