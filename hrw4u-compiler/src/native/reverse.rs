//! Reverse code generator
//!
//! Rebuilds hrw4u source from a [`NativeDocument`]. Lines are first
//! grouped into rulesets, one per hook condition or per condition chain
//! following operators. Adjacent rulesets of the same section share one
//! section block, except that two statement-only rulesets stay apart so
//! the forward compiler gives each its own hook line again.

use super::ast::{LineKind, NativeCond, NativeDocument, NativeOp};
use crate::diagnostic::SourceFile;
use crate::visitor::interpolate::has_native_refs;
use hrw4u_core::tables::{SymbolEntry, ValueType};
use hrw4u_core::{
    CollectedError, CondState, ContextType, Error, ErrorCollector, ErrorMode, Halt, Namespace,
    OperatorState, SectionType, Settings, SuggestionEngine, SymbolTables, TagRef, VarType,
    VariableTable,
};
use tracing::debug;

type Flow<T = ()> = Result<T, Halt>;

/// Output of a reverse pass
#[derive(Debug, Clone)]
pub struct Reversed {
    pub lines: Vec<String>,
    pub errors: Vec<CollectedError>,
}

impl Reversed {
    pub fn text(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

// ============================================================
// Rulesets
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClauseKind {
    If,
    Elif,
    Else,
}

#[derive(Debug)]
enum BodyLine<'d> {
    Op(usize, &'d NativeOp),
    Comment(&'d str),
}

#[derive(Debug)]
struct Clause<'d> {
    kind: ClauseKind,
    conds: Vec<(usize, &'d NativeCond)>,
    body: Vec<BodyLine<'d>>,
}

impl<'d> Clause<'d> {
    fn new(kind: ClauseKind) -> Self {
        Self {
            kind,
            conds: Vec::new(),
            body: Vec::new(),
        }
    }

    fn has_ops(&self) -> bool {
        self.body.iter().any(|b| matches!(b, BodyLine::Op(..)))
    }
}

#[derive(Debug)]
struct Ruleset<'d> {
    section: SectionType,
    leading: Vec<&'d str>,
    clauses: Vec<Clause<'d>>,
}

impl<'d> Ruleset<'d> {
    fn new(section: SectionType, leading: Vec<&'d str>) -> Self {
        Self {
            section,
            leading,
            clauses: Vec::new(),
        }
    }

    /// Operators with no condition in front of them
    fn is_statement_only(&self) -> bool {
        matches!(self.clauses.as_slice(), [clause] if clause.kind == ClauseKind::If && clause.conds.is_empty())
    }

    fn accepts_condition(&self) -> bool {
        self.clauses
            .last()
            .is_none_or(|c| c.kind != ClauseKind::Else && !c.has_ops())
    }

    fn current(&mut self) -> &mut Clause<'d> {
        if self.clauses.is_empty() {
            self.clauses.push(Clause::new(ClauseKind::If));
        }
        let last = self.clauses.len() - 1;
        &mut self.clauses[last]
    }
}

// ============================================================
// Reverser
// ============================================================

/// The reverse visitor
pub struct Reverser<'a> {
    tables: &'a SymbolTables,
    settings: &'a Settings,
    file: &'a SourceFile<'a>,
    collector: ErrorCollector,
    vars: VariableTable,
    unit: String,
    out: Vec<String>,
}

impl<'a> Reverser<'a> {
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
            vars: VariableTable::new(),
            unit: " ".repeat(settings.output.indent),
            out: Vec::new(),
        }
    }

    pub fn with_mode(
        tables: &'a SymbolTables,
        settings: &'a Settings,
        file: &'a SourceFile<'a>,
        mode: ErrorMode,
    ) -> Self {
        Self::new(tables, settings, file, ErrorCollector::new(mode))
    }

    pub fn visit(mut self, doc: &NativeDocument) -> Reversed {
        let result = self
            .group(doc)
            .and_then(|(rulesets, trailing)| self.emit(rulesets, trailing));
        if result.is_err() {
            debug!("🛑 stopping at first error");
        }

        let mut lines = Vec::new();
        if !self.vars.is_empty() {
            lines.push("VARS {".to_string());
            for var in self.vars.iter() {
                lines.push(format!("{}{}: {} @{};", self.unit, var.name, var.ty, var.slot));
            }
            lines.push("}".to_string());
            if !self.out.is_empty() {
                lines.push(String::new());
            }
        }
        lines.append(&mut self.out);

        Reversed {
            lines,
            errors: self.collector.into_errors(),
        }
    }

    // ========================================
    // Grouping
    // ========================================

    fn group<'d>(&mut self, doc: &'d NativeDocument) -> Flow<(Vec<Ruleset<'d>>, Vec<&'d str>)> {
        let default = self.settings.reverse.default_section;
        let mut rulesets: Vec<Ruleset<'d>> = Vec::new();
        let mut pending: Vec<&'d str> = Vec::new();

        for line in &doc.lines {
            let number = line.inner.number;
            match &line.inner.kind {
                LineKind::Blank => {}
                LineKind::Comment(text) => pending.push(text),
                LineKind::Cond(cond) => {
                    let tag = TagRef::parse(&cond.tag);
                    if tag.namespace == Namespace::Hook {
                        let section = match self.tables.section_for_hook(tag.tag) {
                            Ok(section) => section,
                            Err(error) => {
                                self.report(number, error, None)?;
                                default
                            }
                        };
                        debug!("`{}' -> `{}'", tag.tag, section);
                        rulesets.push(Ruleset::new(section, std::mem::take(&mut pending)));
                        continue;
                    }

                    let section = rulesets.last().map_or(default, |r| r.section);
                    if rulesets.last().is_none_or(|r| !r.accepts_condition()) {
                        rulesets.push(Ruleset::new(section, std::mem::take(&mut pending)));
                    }
                    if let Some(ruleset) = rulesets.last_mut() {
                        ruleset.current().conds.push((number, cond));
                    }
                }
                LineKind::Elif | LineKind::Else => {
                    let kind = if matches!(line.inner.kind, LineKind::Elif) {
                        ClauseKind::Elif
                    } else {
                        ClauseKind::Else
                    };
                    let open = rulesets.last_mut().filter(|r| {
                        r.clauses.first().is_some_and(|c| !c.conds.is_empty())
                            && r.clauses.last().is_some_and(|c| c.kind != ClauseKind::Else)
                    });
                    match open {
                        Some(ruleset) => ruleset.clauses.push(Clause::new(kind)),
                        None => {
                            let word = if kind == ClauseKind::Elif { "elif" } else { "else" };
                            let error = Error::Semantic(format!("'{}' without a preceding condition", word));
                            self.report(number, error, None)?;
                        }
                    }
                }
                LineKind::Operator(op) => {
                    if rulesets.is_empty() {
                        rulesets.push(Ruleset::new(default, Vec::new()));
                    }
                    if let Some(ruleset) = rulesets.last_mut() {
                        let clause = ruleset.current();
                        clause.body.extend(pending.drain(..).map(BodyLine::Comment));
                        clause.body.push(BodyLine::Op(number, op));
                    }
                }
            }
        }

        Ok((rulesets, pending))
    }

    // ========================================
    // Emission
    // ========================================

    fn push(&mut self, level: usize, text: &str) {
        self.out.push(format!("{}{}", self.unit.repeat(level), text));
    }

    fn emit<'d>(&mut self, rulesets: Vec<Ruleset<'d>>, trailing: Vec<&'d str>) -> Flow {
        let mut blocks: Vec<(SectionType, Vec<Ruleset<'d>>)> = Vec::new();
        for ruleset in rulesets {
            let merge = blocks.last().is_some_and(|(section, members)| {
                *section == ruleset.section
                    && !(ruleset.is_statement_only()
                        && members.last().is_some_and(Ruleset::is_statement_only))
            });
            match blocks.last_mut() {
                Some((_, members)) if merge => members.push(ruleset),
                _ => blocks.push((ruleset.section, vec![ruleset])),
            }
        }

        let has_blocks = !blocks.is_empty();
        for (section, members) in blocks {
            if !self.out.is_empty() {
                self.out.push(String::new());
            }
            self.out.push(format!("{} {{", section));
            for ruleset in &members {
                self.emit_ruleset(ruleset)?;
            }
            self.out.push("}".to_string());
        }

        let level = usize::from(has_blocks);
        if has_blocks && !trailing.is_empty() {
            // Comments after the last rule belong inside the last section
            let close = self.out.pop();
            for comment in &trailing {
                self.push(level, &format!("# {}", comment));
            }
            self.out.extend(close);
        } else {
            for comment in &trailing {
                self.push(0, &format!("# {}", comment));
            }
        }
        Ok(())
    }

    fn emit_ruleset(&mut self, ruleset: &Ruleset<'_>) -> Flow {
        for comment in &ruleset.leading {
            self.push(1, &format!("# {}", comment));
        }

        if ruleset.is_statement_only() {
            return self.emit_body(ruleset.section, &ruleset.clauses[0].body, 1);
        }
        if ruleset.clauses.is_empty() {
            return Ok(());
        }

        for clause in &ruleset.clauses {
            let head = match clause.kind {
                ClauseKind::If => format!("if {} {{", self.render_expr(ruleset.section, &clause.conds)?),
                ClauseKind::Elif => format!("}} elif {} {{", self.render_expr(ruleset.section, &clause.conds)?),
                ClauseKind::Else => "} else {".to_string(),
            };
            self.push(1, &head);
            self.emit_body(ruleset.section, &clause.body, 2)?;
        }
        self.push(1, "}");
        Ok(())
    }

    fn emit_body(&mut self, section: SectionType, body: &[BodyLine<'_>], level: usize) -> Flow {
        for line in body {
            match line {
                BodyLine::Comment(text) => self.push(level, &format!("# {}", text)),
                BodyLine::Op(number, op) => match self.render_op(section, op) {
                    Ok(text) => self.push(level, &text),
                    Err(error) => {
                        let symbol = matches!(error, Error::UnknownSymbol(_)).then_some(op.command.as_str());
                        self.report(*number, error, symbol.map(|s| (s, ContextType::Operator)))?;
                    }
                },
            }
        }
        Ok(())
    }

    // ========================================
    // Conditions
    // ========================================

    fn render_expr(&mut self, section: SectionType, conds: &[(usize, &NativeCond)]) -> Flow<String> {
        let mut out = String::new();
        let mut groups: Vec<usize> = Vec::new();
        let mut conj: Option<&str> = None;

        for (number, cond) in conds {
            let tag = TagRef::parse(&cond.tag);
            let mut state = CondState::new();
            for modifier in &cond.modifiers {
                if let Err(error) = state.add_modifier(modifier) {
                    self.report(*number, error, None)?;
                }
            }
            let next = if state.or { " || " } else { " && " };

            if tag.is_group_end() {
                match groups.pop() {
                    Some(pos) => {
                        out.push(')');
                        if state.not {
                            out.insert(pos, '!');
                        }
                    }
                    None => {
                        let error = Error::Semantic("GROUP:END without an open GROUP".to_string());
                        self.report(*number, error, None)?;
                    }
                }
                conj = Some(next);
                continue;
            }

            if let Some(c) = conj.take() {
                out.push_str(c);
            }
            if tag.namespace == Namespace::Group {
                groups.push(out.len());
                out.push('(');
                continue;
            }

            match self.render_cond(section, &tag, cond.operand.as_deref(), &state) {
                Ok(text) => out.push_str(&text),
                Err(error) => {
                    let symbol = matches!(error, Error::UnknownSymbol(_)).then_some(tag.tag);
                    self.report(*number, error, symbol.map(|s| (s, ContextType::Condition)))?;
                    out.push_str("true");
                }
            }
            conj = Some(next);
        }

        if let Some((number, _)) = conds.last().filter(|_| !groups.is_empty()) {
            let error = Error::Semantic("GROUP without a matching GROUP:END".to_string());
            self.report(*number, error, None)?;
            out.extend(groups.iter().map(|_| ')'));
        }
        if out.is_empty() {
            out.push_str("true");
        }
        Ok(out)
    }

    fn render_cond(
        &mut self,
        section: SectionType,
        tag: &TagRef<'_>,
        operand: Option<&str>,
        state: &CondState,
    ) -> hrw4u_core::Result<String> {
        let bang = if state.not { "!" } else { "" };
        if tag.namespace == Namespace::Literal {
            return Ok(format!("{}{}", bang, tag.tag.to_ascii_lowercase()));
        }

        let (lhs, value) = self.reverse_tag(section, tag, true)?;
        let Some(operand) = operand else {
            return Ok(format!("{}{}", bang, lhs));
        };

        let plain = !state.nocase && state.substring.is_none();
        if operand == "=\"\"" && value == Some(ValueType::String) && plain {
            return Ok(if state.not { lhs } else { format!("!{}", lhs) });
        }

        let with = state.with_clause();
        let with = if with.is_empty() {
            String::new()
        } else {
            format!(" with {}", with.join(", "))
        };

        let cmp = if let Some(v) = operand.strip_prefix('=') {
            let op = if state.not { "!=" } else { "==" };
            format!("{} {} {}", lhs, op, self.render_literal(section, v))
        } else if let Some(v) = operand.strip_prefix('>') {
            format!("{}{} > {}", bang, lhs, self.render_literal(section, v))
        } else if let Some(v) = operand.strip_prefix('<') {
            format!("{}{} < {}", bang, lhs, self.render_literal(section, v))
        } else if operand.len() >= 2 && operand.starts_with('/') && operand.ends_with('/') {
            let op = if state.not { "!~" } else { "~" };
            format!("{} {} {}", lhs, op, operand)
        } else if let Some(inner) = operand.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            let items: Vec<String> = split_list(inner).map(quote_item).collect();
            format!("{}{} in [{}]", bang, lhs, items.join(", "))
        } else if let Some(inner) = operand.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            let items: Vec<&str> = split_list(inner).collect();
            format!("{}{} in {{{}}}", bang, lhs, items.join(", "))
        } else {
            let op = if state.not { "!=" } else { "==" };
            format!("{} {} {}", lhs, op, quote_item(operand))
        };

        Ok(format!("{}{}", cmp, with))
    }

    /// A native reference as a DSL identifier or call, plus its value type
    fn reverse_tag(
        &mut self,
        section: SectionType,
        tag: &TagRef<'_>,
        quote_args: bool,
    ) -> hrw4u_core::Result<(String, Option<ValueType>)> {
        if let Some(ty) = VarType::from_cond_tag(tag.tag) {
            let slot = parse_slot(tag.payload.unwrap_or_default())?;
            return Ok((self.use_var(ty, slot)?, None));
        }

        if let Some(entry) = self.tables.reverse_function(tag.tag) {
            let args: Vec<String> = tag
                .payload
                .map(|p| {
                    split_list(p)
                        .map(|a| if quote_args { quote_item(a) } else { a.to_string() })
                        .collect()
                })
                .unwrap_or_default();
            return Ok((format!("{}({})", entry.key, args.join(", ")), Some(entry.value)));
        }

        let found = self.tables.reverse_condition(tag, section)?;
        Ok((found.ident, Some(found.entry.value)))
    }

    fn use_var(&mut self, ty: VarType, slot: usize) -> hrw4u_core::Result<String> {
        if let Some(var) = self.vars.by_slot(ty, slot) {
            return Ok(var.name.clone());
        }
        let prefix = match ty {
            VarType::Bool => "flag",
            VarType::Int8 => "int8",
            VarType::Int16 => "int16",
        };
        let name = format!("{}_{}", prefix, slot);
        self.vars.declare(&name, ty.name(), Some(slot))?;
        Ok(name)
    }

    // ========================================
    // Values
    // ========================================

    /// A native value as a DSL literal or identifier
    fn render_literal(&mut self, section: SectionType, value: &str) -> String {
        if is_quoted(value) {
            return self.unterpolate(section, value);
        }
        if value.starts_with("%{") && value.ends_with('}') {
            let tag = TagRef::parse(value);
            if let Ok((ident, _)) = self.reverse_tag(section, &tag, true) {
                return ident;
            }
        }
        quote_item(value)
    }

    /// `%{..}` inside a string back to `{ident}`
    fn unterpolate(&mut self, section: SectionType, text: &str) -> String {
        if !has_native_refs(text) {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(idx) = rest.find("%{") {
            out.push_str(&rest[..idx]);
            let tail = &rest[idx..];
            let Some(end) = tail.find('}') else {
                out.push_str(tail);
                return out;
            };
            let tag = TagRef::parse(&tail[..=end]);
            match self.reverse_tag(section, &tag, false) {
                Ok((ident, _)) => {
                    out.push('{');
                    out.push_str(&ident);
                    out.push('}');
                }
                Err(_) => out.push_str(&tail[..=end]),
            }
            rest = &tail[end + 1..];
        }
        out.push_str(rest);
        out
    }

    // ========================================
    // Operators
    // ========================================

    fn render_op(&mut self, section: SectionType, op: &NativeOp) -> hrw4u_core::Result<String> {
        let mut state = OperatorState::new();
        for modifier in &op.modifiers {
            state.add_modifier(modifier)?;
        }

        if op.command == "no-op" && op.args.is_empty() && state.last && !state.inv && !state.qsa {
            return Ok("break;".to_string());
        }

        if let Some(ty) = VarType::from_operator(&op.command) {
            let [slot, value] = op.args.as_slice() else {
                return Err(Error::Semantic(format!("'{}' expects a slot and a value", op.command)));
            };
            let name = self.use_var(ty, parse_slot(slot)?)?;
            let value = self.render_literal(section, value);
            return Ok(format!("{} = {}{};", name, value, operator_with(&state)));
        }

        if op.command == "rm-destination" && op.args.first().map(String::as_str) == Some("QUERY") {
            let name = if state.inv { "keep_query" } else { "remove_query" };
            state.inv = false;
            let args: Vec<String> = op.args[1..].iter().map(|a| self.render_literal(section, a)).collect();
            return Ok(format!("{}({}){};", name, args.join(", "), operator_with(&state)));
        }

        match self.tables.reverse_operator(&op.command, section) {
            Ok(entry) => return self.render_assignment(section, entry, op, &state),
            Err(Error::UnknownSymbol(_)) => {}
            Err(error) => return Err(error),
        }

        let entry = self
            .tables
            .reverse_statement(&op.command)
            .ok_or_else(|| Error::UnknownSymbol(op.command.clone()))?;
        if !entry.valid_in(section) {
            return Err(Error::SectionRestriction {
                symbol: entry.key.to_string(),
                section,
            });
        }

        if op.args.is_empty() && state.is_empty() {
            return Ok(format!("{};", entry.key));
        }
        let args: Vec<String> = op.args.iter().map(|a| self.render_literal(section, a)).collect();
        Ok(format!("{}({}){};", entry.key, args.join(", "), operator_with(&state)))
    }

    fn render_assignment(
        &mut self,
        section: SectionType,
        entry: &SymbolEntry,
        op: &NativeOp,
        state: &OperatorState,
    ) -> hrw4u_core::Result<String> {
        let command = op.command.as_str();
        let family = entry.family;
        let append = family.is_some_and(|f| f.add == Some(command));
        let remove = family.is_some_and(|f| f.rm == command);

        let mut args = op.args.iter().map(String::as_str).peekable();
        if entry.payload.is_some() && args.peek().copied() == entry.payload {
            args.next();
        }

        let target = if entry.is_namespace() {
            let suffix = args
                .next()
                .ok_or_else(|| Error::Semantic(format!("'{}' is missing its name argument", command)))?;
            let suffix = if entry.upper {
                suffix.to_ascii_lowercase()
            } else {
                suffix.to_string()
            };
            format!("{}{}", entry.key, suffix)
        } else {
            entry.key.to_string()
        };

        let value = if remove {
            "\"\"".to_string()
        } else {
            let rest: Vec<&str> = args.collect();
            if rest.is_empty() {
                return Err(Error::Semantic(format!("'{}' is missing its value", command)));
            }
            self.render_literal(section, &rest.join(" "))
        };

        let op_text = if append { "+=" } else { "=" };
        Ok(format!("{} {} {}{};", target, op_text, value, operator_with(state)))
    }

    // ========================================
    // Errors
    // ========================================

    fn report(&mut self, line: usize, error: Error, symbol: Option<(&str, ContextType)>) -> Flow {
        let suggestions = match symbol {
            Some((symbol, context)) => {
                SuggestionEngine::new(self.tables, self.settings.suggestions.clone())
                    .get_suggestions(symbol, context, None, &[])
            }
            None => Vec::new(),
        };
        let span = self.file.line_span(line);
        let collected = self.file.error(span, error.to_string(), error.kind(), suggestions);
        self.collector.add_error(collected)
    }
}

fn operator_with(state: &OperatorState) -> String {
    if state.is_empty() {
        String::new()
    } else {
        format!(" with {}", state.to_list().join(", "))
    }
}

fn parse_slot(text: &str) -> hrw4u_core::Result<usize> {
    text.trim()
        .parse()
        .map_err(|_| Error::Variable(format!("invalid state slot '{}'", text)))
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

fn is_bare_literal(text: &str) -> bool {
    text == "true"
        || text == "false"
        || (!text.is_empty() && text.chars().all(|c| c.is_ascii_digit()))
}

/// Keep numbers and quoted strings, quote everything else
fn quote_item(text: &str) -> String {
    if is_quoted(text) || is_bare_literal(text) {
        text.to_string()
    } else {
        format!("\"{}\"", text)
    }
}

fn split_list(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::parser::parse_native;
    use pretty_assertions::assert_eq;

    fn run(source: &str, mode: ErrorMode) -> Reversed {
        let (doc, errors) = parse_native(source);
        assert!(errors.is_empty(), "syntax errors: {errors:?}");
        let settings = Settings::default();
        let file = SourceFile::new("test.conf", source);
        Reverser::with_mode(SymbolTables::global(), &settings, &file, mode).visit(&doc)
    }

    fn reverse(source: &str) -> String {
        let reversed = run(source, ErrorMode::FailFast);
        assert!(reversed.errors.is_empty(), "errors: {:?}", reversed.errors);
        reversed.text()
    }

    #[test]
    fn test_golden_conditional() {
        let out = reverse(
            "cond %{REMAP_PSEUDO_HOOK} [AND]\n\
             cond %{HEADER:X-Foo} =\"bar\" [AND,NOCASE]\n\
             cond %{METHOD} =\"GET\"\n    \
             set-header X-Bar \"baz\"\n",
        );
        assert_eq!(
            out,
            "REMAP {\n    \
             if outbound.req.X-Foo == \"bar\" with NOCASE && inbound.method == \"GET\" {\n        \
             inbound.req.X-Bar = \"baz\";\n    \
             }\n\
             }\n"
        );
    }

    #[test]
    fn test_groups_negation_and_existence() {
        let out = reverse(
            "cond %{SEND_RESPONSE_HDR_HOOK} [AND]\n\
             cond %{STATUS} >399 [OR]\n\
             cond %{GROUP}\n    \
             cond %{CLIENT-HEADER:X-Debug} =\"\" [AND,NOT]\n    \
             cond %{COOKIE:session} =\"\"\n\
             cond %{GROUP:END} [NOT]\n    \
             rm-header X-B\n",
        );
        assert_eq!(
            out,
            "SEND_RESPONSE {\n    \
             if inbound.status > 399 || !(inbound.req.X-Debug && !inbound.cookie.session) {\n        \
             inbound.resp.X-B = \"\";\n    \
             }\n\
             }\n"
        );
    }

    #[test]
    fn test_elif_else_and_statement_blocks() {
        let out = reverse(
            "cond %{REMAP_PSEUDO_HOOK} [AND]\n    \
             set-debug\n\
             \n\
             cond %{REMAP_PSEUDO_HOOK} [AND]\n\
             cond %{CLIENT-URL:PATH} /^\\/api/ [NOT]\n    \
             no-op [L]\n\
             elif\n    \
             cond %{IP:CLIENT} {10.0.0.0/8,127.0.0.1}\n        \
             rm-destination QUERY \"a,b\" [I]\n\
             else\n    \
             set-redirect 302 \"https://%{CLIENT-URL:HOST}/x\"\n",
        );
        assert_eq!(
            out,
            "REMAP {\n    \
             set-debug;\n    \
             if inbound.url.path !~ /^\\/api/ {\n        \
             break;\n    \
             } elif inbound.ip in {10.0.0.0/8, 127.0.0.1} {\n        \
             keep_query(\"a,b\");\n    \
             } else {\n        \
             set-redirect(302, \"https://{inbound.url.host}/x\");\n    \
             }\n\
             }\n"
        );
    }

    #[test]
    fn test_adjacent_statement_rulesets_stay_apart() {
        let out = reverse(
            "cond %{REMAP_PSEUDO_HOOK} [AND]\n    \
             set-debug\n\
             cond %{REMAP_PSEUDO_HOOK} [AND]\n    \
             no-op\n",
        );
        assert_eq!(out, "REMAP {\n    set-debug;\n}\n\nREMAP {\n    no-op;\n}\n");
    }

    #[test]
    fn test_state_variables_declared_first() {
        let out = reverse(
            "cond %{READ_RESPONSE_HDR_HOOK} [AND]\n\
             cond %{STATE-FLAG:3}\n    \
             set-state-int8 1 5\n",
        );
        assert_eq!(
            out,
            "VARS {\n    \
             flag_3: bool @3;\n    \
             int8_1: int8 @1;\n\
             }\n\
             \n\
             READ_RESPONSE {\n    \
             if flag_3 {\n        \
             int8_1 = 5;\n    \
             }\n\
             }\n"
        );
    }

    #[test]
    fn test_headless_rules_use_default_section() {
        let out = reverse("cond %{METHOD} (GET,\"HEAD\") [OR]\ncond %{RANDOM:100} <10\n    add-header X-A \"1\" [L]\n");
        assert_eq!(
            out,
            "REMAP {\n    \
             if inbound.method in [\"GET\", \"HEAD\"] || random(100) < 10 {\n        \
             inbound.req.X-A += \"1\" with L;\n    \
             }\n\
             }\n"
        );
    }

    #[test]
    fn test_ambiguous_status_by_section() {
        let out = reverse("cond %{READ_RESPONSE_HDR_HOOK}\ncond %{STATUS} =404\n    set-status 200\n");
        assert!(out.contains("if outbound.status == 404 {"));
        assert!(out.contains("inbound.status = 200;"));
    }

    #[test]
    fn test_comments_are_kept() {
        let out = reverse("# top\ncond %{REMAP_PSEUDO_HOOK} [AND]\n    # inner\n    set-debug\n# tail\n");
        assert_eq!(out, "REMAP {\n    # top\n    # inner\n    set-debug;\n    # tail\n}\n");
    }

    #[test]
    fn test_unknown_tag_reports_with_line() {
        let reversed = run(
            "cond %{REMAP_PSEUDO_HOOK} [AND]\ncond %{BOGUS-TAG:x} =\"1\"\n    set-debug\n    set-hedaer X 1\n",
            ErrorMode::CollectAll,
        );
        let lines: Vec<usize> = reversed.errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![2, 4]);
        assert!(reversed.errors.iter().all(|e| e.kind == hrw4u_core::ErrorKind::UnknownSymbol));
    }

    #[test]
    fn test_unknown_hook() {
        let reversed = run("cond %{POST_REMAP_HOOK} [AND]\n    set-debug\n", ErrorMode::FailFast);
        assert_eq!(reversed.errors.len(), 1);
        assert_eq!(reversed.errors[0].kind, hrw4u_core::ErrorKind::UnknownHook);
    }

    #[test]
    fn test_dangling_else() {
        let reversed = run("cond %{REMAP_PSEUDO_HOOK} [AND]\n    set-debug\nelse\n", ErrorMode::CollectAll);
        assert_eq!(reversed.errors.len(), 1);
        assert_eq!(reversed.errors[0].kind, hrw4u_core::ErrorKind::Semantic);
    }
}
