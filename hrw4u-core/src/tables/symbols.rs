//! Primary symbol tables
//!
//! Three independent tables map DSL identifiers to native tags: conditions,
//! operators (assignment targets and statement functions) and condition
//! functions. A key ending in `.` is an open namespace; whatever follows it
//! becomes the suffix of the native payload.

use crate::section::{SectionSet, SectionType};
use crate::states::Modifier;

/// The value a symbol produces or accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Number,
    Bool,
    Ip,
}

impl ValueType {
    /// Condition modifiers a value of this type accepts by default
    pub const fn modifiers(self) -> &'static [Modifier] {
        match self {
            ValueType::String => TEXT_MODIFIERS,
            ValueType::Number | ValueType::Bool | ValueType::Ip => PLAIN_MODIFIERS,
        }
    }
}

/// Condition modifiers for text symbols
pub const TEXT_MODIFIERS: &[Modifier] = &[
    Modifier::And,
    Modifier::Or,
    Modifier::Not,
    Modifier::NoCase,
    Modifier::Pre,
    Modifier::Suf,
    Modifier::Ext,
    Modifier::Mid,
];

/// Condition modifiers for numeric, boolean and IP symbols
pub const PLAIN_MODIFIERS: &[Modifier] = &[Modifier::And, Modifier::Or, Modifier::Not];

/// How the reverse tool treats an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReverseHint {
    /// Canonical DSL spelling for its native tag
    Primary,
    /// Alias; never produced by the reverse tool
    Skip,
    /// Chosen by section through a context map or the ambiguous tag table
    Context,
}

/// Closed suffix sets for namespaces that validate what follows them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuffixGroup {
    Url,
    Geo,
    Id,
    Date,
    Conn,
    Cert,
    San,
    HttpCntl,
}

impl SuffixGroup {
    /// Canonical (upper-case) spellings
    pub const fn values(self) -> &'static [&'static str] {
        match self {
            SuffixGroup::Url => &["HOST", "PORT", "PATH", "QUERY", "SCHEME", "FRAGMENT"],
            SuffixGroup::Geo => &["COUNTRY", "COUNTRY-ISO", "ASN", "ASN-NAME"],
            SuffixGroup::Id => &["UNIQUE", "REQUEST", "PROCESS", "THREAD", "SESSION", "SSN"],
            SuffixGroup::Date => &[
                "YEAR", "MONTH", "DAY", "HOUR", "MINUTE", "SECOND", "WEEKDAY", "YEARDAY",
            ],
            SuffixGroup::Conn => &[
                "TLS",
                "H2",
                "IPV4",
                "IPV6",
                "IP-FAMILY",
                "STACK",
                "LOCAL-ADDR",
                "LOCAL-PORT",
                "REMOTE-ADDR",
                "REMOTE-PORT",
            ],
            SuffixGroup::Cert => &[
                "PEM",
                "SIG",
                "SUBJECT",
                "ISSUER",
                "SERIAL",
                "NOT_BEFORE",
                "NOT_AFTER",
                "VERSION",
            ],
            SuffixGroup::San => &["DNS", "IP", "EMAIL", "URI"],
            SuffixGroup::HttpCntl => &[
                "LOGGING",
                "INTERCEPT_RETRY",
                "RESP_CACHEABLE",
                "REQ_CACHEABLE",
                "SERVER_NO_STORE",
                "TXN_DEBUG",
                "SKIP_REMAP",
            ],
        }
    }

    /// Case-insensitive membership
    pub fn validate(self, suffix: &str) -> bool {
        self.values().iter().any(|v| v.eq_ignore_ascii_case(suffix))
    }
}

/// Set/add/remove variants of an assignment operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OpFamily {
    pub add: Option<&'static str>,
    pub rm: &'static str,
}

/// One symbol-table row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub key: &'static str,
    /// Native tag (conditions, functions) or command (operators)
    pub tag: &'static str,
    /// Fixed payload placed before any suffix
    pub payload: Option<&'static str>,
    pub value: ValueType,
    /// Condition modifiers allowed on this symbol
    pub modifiers: &'static [Modifier],
    pub sections: Option<SectionSet>,
    pub suffixes: Option<SuffixGroup>,
    /// Upper-case the suffix when rendering
    pub upper: bool,
    pub reverse: ReverseHint,
    pub family: Option<OpFamily>,
    /// Argument count bounds for functions
    pub min_args: usize,
    pub max_args: Option<usize>,
    pub doc: &'static str,
}

impl SymbolEntry {
    pub const fn new(key: &'static str, tag: &'static str) -> Self {
        Self {
            key,
            tag,
            payload: None,
            value: ValueType::String,
            modifiers: TEXT_MODIFIERS,
            sections: None,
            suffixes: None,
            upper: false,
            reverse: ReverseHint::Primary,
            family: None,
            min_args: 0,
            max_args: Some(0),
            doc: "",
        }
    }

    pub const fn payload(mut self, payload: &'static str) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Also resets the allowed modifiers to the type's defaults
    pub const fn value(mut self, value: ValueType) -> Self {
        self.value = value;
        self.modifiers = value.modifiers();
        self
    }

    pub const fn modifiers(mut self, modifiers: &'static [Modifier]) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub const fn sections(mut self, sections: SectionSet) -> Self {
        self.sections = Some(sections);
        self
    }

    /// Validated, upper-cased suffix
    pub const fn suffixes(mut self, group: SuffixGroup) -> Self {
        self.suffixes = Some(group);
        self.upper = true;
        self
    }

    pub const fn upper(mut self) -> Self {
        self.upper = true;
        self
    }

    pub const fn skip(mut self) -> Self {
        self.reverse = ReverseHint::Skip;
        self
    }

    pub const fn context(mut self) -> Self {
        self.reverse = ReverseHint::Context;
        self
    }

    pub const fn family(mut self, add: Option<&'static str>, rm: &'static str) -> Self {
        self.family = Some(OpFamily { add, rm });
        self
    }

    pub const fn args(mut self, min: usize, max: Option<usize>) -> Self {
        self.min_args = min;
        self.max_args = max;
        self
    }

    pub const fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    /// Open namespace such as `inbound.req.`
    pub fn is_namespace(&self) -> bool {
        self.key.ends_with('.')
    }

    pub fn allows(&self, modifier: Modifier) -> bool {
        self.modifiers.contains(&modifier)
    }

    pub fn valid_in(&self, section: SectionType) -> bool {
        self.sections.is_none_or(|s| s.contains(section))
    }

    pub fn accepts_args(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }

    /// Human readable arity, used in error messages
    pub fn arity(&self) -> String {
        match self.max_args {
            Some(max) if max == self.min_args => max.to_string(),
            Some(max) => format!("{}-{}", self.min_args, max),
            None => format!("at least {}", self.min_args),
        }
    }

    /// Native tag body for a given suffix: `TAG[:payload][:SUFFIX]`
    pub fn target(&self, suffix: Option<&str>) -> String {
        let mut out = self.tag.to_string();
        if let Some(p) = self.payload {
            out.push(':');
            out.push_str(p);
        }
        if let Some(s) = suffix {
            out.push(':');
            if self.upper {
                out.push_str(&s.to_ascii_uppercase());
            } else {
                out.push_str(s);
            }
        }
        out
    }
}

// ============================================================
// Conditions
// ============================================================

const HTTP: SectionSet = SectionSet::HTTP;
const UPSTREAM: SectionSet = SectionSet::UPSTREAM;
const EARLY: SectionSet = SectionSet::EARLY_REQUEST;

pub static CONDITIONS: &[SymbolEntry] = &[
    SymbolEntry::new("inbound.ip", "IP")
        .payload("CLIENT")
        .value(ValueType::Ip)
        .doc("IP address of the connecting client."),
    SymbolEntry::new("inbound.server", "IP")
        .payload("INBOUND")
        .value(ValueType::Ip)
        .doc("IP address of the proxy's inbound interface."),
    SymbolEntry::new("outbound.ip", "IP")
        .payload("SERVER")
        .value(ValueType::Ip)
        .sections(UPSTREAM)
        .doc("IP address of the origin server."),
    SymbolEntry::new("outbound.server", "IP")
        .payload("OUTBOUND")
        .value(ValueType::Ip)
        .sections(UPSTREAM)
        .doc("IP address of the proxy's outbound interface."),
    SymbolEntry::new("inbound.method", "METHOD")
        .sections(HTTP)
        .context()
        .doc("HTTP method of the client request."),
    SymbolEntry::new("outbound.method", "METHOD")
        .sections(EARLY)
        .context()
        .doc("HTTP method of the request sent to the origin."),
    SymbolEntry::new("inbound.status", "STATUS")
        .value(ValueType::Number)
        .sections(HTTP)
        .context()
        .doc("HTTP status code of the response to the client."),
    SymbolEntry::new("outbound.status", "STATUS")
        .value(ValueType::Number)
        .sections(UPSTREAM)
        .context()
        .doc("HTTP status code returned by the origin."),
    SymbolEntry::new("now", "NOW")
        .value(ValueType::Number)
        .doc("Current time as seconds since the epoch."),
    SymbolEntry::new("tcp.info", "TCP-INFO").doc("TCP_INFO statistics of the client connection."),
    SymbolEntry::new("capture.", "LAST-CAPTURE").doc("Capture group of the last successful regex match."),
    SymbolEntry::new("from.url.", "FROM-URL")
        .sections(HTTP)
        .suffixes(SuffixGroup::Url)
        .doc("Component of the remap rule's source URL."),
    SymbolEntry::new("to.url.", "TO-URL")
        .suffixes(SuffixGroup::Url)
        .doc("Component of the remap rule's target URL."),
    SymbolEntry::new("geo.", "GEO")
        .suffixes(SuffixGroup::Geo)
        .doc("Geographic information about the client address."),
    SymbolEntry::new("http.cntl.", "HTTP-CNTL")
        .value(ValueType::Bool)
        .sections(HTTP)
        .suffixes(SuffixGroup::HttpCntl)
        .doc("Transaction control flag."),
    SymbolEntry::new("id.", "ID")
        .suffixes(SuffixGroup::Id)
        .doc("Transaction, process or session identifier."),
    SymbolEntry::new("now.", "NOW")
        .value(ValueType::Number)
        .suffixes(SuffixGroup::Date)
        .doc("Component of the current local time."),
    SymbolEntry::new("inbound.conn.client-cert.san.", "INBOUND")
        .payload("CLIENT-CERT:SAN")
        .suffixes(SuffixGroup::San)
        .doc("Subject alternative names of the client certificate."),
    SymbolEntry::new("inbound.conn.client-cert.SAN.", "INBOUND")
        .payload("CLIENT-CERT:SAN")
        .suffixes(SuffixGroup::San)
        .skip(),
    SymbolEntry::new("inbound.conn.server-cert.san.", "INBOUND")
        .payload("SERVER-CERT:SAN")
        .suffixes(SuffixGroup::San)
        .doc("Subject alternative names of the certificate presented to the client."),
    SymbolEntry::new("inbound.conn.server-cert.SAN.", "INBOUND")
        .payload("SERVER-CERT:SAN")
        .suffixes(SuffixGroup::San)
        .skip(),
    SymbolEntry::new("inbound.conn.client-cert.", "INBOUND")
        .payload("CLIENT-CERT")
        .suffixes(SuffixGroup::Cert)
        .doc("Field of the client certificate."),
    SymbolEntry::new("inbound.conn.server-cert.", "INBOUND")
        .payload("SERVER-CERT")
        .suffixes(SuffixGroup::Cert)
        .doc("Field of the certificate presented to the client."),
    SymbolEntry::new("inbound.conn.", "INBOUND")
        .suffixes(SuffixGroup::Conn)
        .doc("Property of the client connection."),
    SymbolEntry::new("outbound.conn.client-cert.san.", "OUTBOUND")
        .payload("CLIENT-CERT:SAN")
        .sections(UPSTREAM)
        .suffixes(SuffixGroup::San)
        .doc("Subject alternative names of the certificate sent to the origin."),
    SymbolEntry::new("outbound.conn.client-cert.SAN.", "OUTBOUND")
        .payload("CLIENT-CERT:SAN")
        .sections(UPSTREAM)
        .suffixes(SuffixGroup::San)
        .skip(),
    SymbolEntry::new("outbound.conn.server-cert.san.", "OUTBOUND")
        .payload("SERVER-CERT:SAN")
        .sections(UPSTREAM)
        .suffixes(SuffixGroup::San)
        .doc("Subject alternative names of the origin certificate."),
    SymbolEntry::new("outbound.conn.server-cert.SAN.", "OUTBOUND")
        .payload("SERVER-CERT:SAN")
        .sections(UPSTREAM)
        .suffixes(SuffixGroup::San)
        .skip(),
    SymbolEntry::new("outbound.conn.client-cert.", "OUTBOUND")
        .payload("CLIENT-CERT")
        .sections(UPSTREAM)
        .suffixes(SuffixGroup::Cert)
        .doc("Field of the certificate sent to the origin."),
    SymbolEntry::new("outbound.conn.server-cert.", "OUTBOUND")
        .payload("SERVER-CERT")
        .sections(UPSTREAM)
        .suffixes(SuffixGroup::Cert)
        .doc("Field of the origin certificate."),
    SymbolEntry::new("outbound.conn.", "OUTBOUND")
        .sections(UPSTREAM)
        .suffixes(SuffixGroup::Conn)
        .doc("Property of the origin connection."),
    SymbolEntry::new("inbound.cookie.", "COOKIE")
        .sections(HTTP)
        .doc("Cookie sent by the client."),
    SymbolEntry::new("outbound.cookie.", "COOKIE")
        .sections(UPSTREAM)
        .skip()
        .doc("Cookie on the request sent to the origin."),
    SymbolEntry::new("inbound.req.", "CLIENT-HEADER")
        .sections(HTTP)
        .doc("Header of the original client request."),
    SymbolEntry::new("inbound.resp.", "HEADER")
        .sections(SectionSet::CLIENT_RESPONSE)
        .context()
        .doc("Header of the response sent to the client."),
    SymbolEntry::new("outbound.req.", "HEADER")
        .sections(EARLY)
        .context()
        .doc("Header of the request sent to the origin."),
    SymbolEntry::new("outbound.resp.", "HEADER")
        .sections(SectionSet::ORIGIN_RESPONSE)
        .context()
        .doc("Header of the response received from the origin."),
    SymbolEntry::new("inbound.url.", "CLIENT-URL")
        .sections(HTTP)
        .suffixes(SuffixGroup::Url)
        .doc("Component of the client request URL."),
    SymbolEntry::new("outbound.url.", "NEXT-HOP")
        .sections(EARLY)
        .suffixes(SuffixGroup::Url)
        .doc("Component of the next-hop URL."),
];

// ============================================================
// Condition functions
// ============================================================

pub static FUNCTIONS: &[SymbolEntry] = &[
    SymbolEntry::new("access", "ACCESS")
        .value(ValueType::Bool)
        .args(1, Some(1))
        .doc("True when the given file exists and is readable."),
    SymbolEntry::new("cache", "CACHE")
        .args(0, Some(0))
        .doc("Cache lookup result: miss, hit-stale, hit-fresh or skipped."),
    SymbolEntry::new("cidr", "CIDR")
        .args(1, Some(2))
        .doc("Client address masked to the given IPv4 and IPv6 prefix lengths."),
    SymbolEntry::new("internal", "INTERNAL-TRANSACTION")
        .value(ValueType::Bool)
        .args(0, Some(0))
        .doc("True for transactions generated inside the proxy."),
    SymbolEntry::new("random", "RANDOM")
        .value(ValueType::Number)
        .args(1, Some(1))
        .doc("Random integer in [0, n)."),
    SymbolEntry::new("ssn-txn-count", "SSN-TXN-COUNT")
        .value(ValueType::Number)
        .args(0, Some(0))
        .doc("Number of transactions on the client session."),
    SymbolEntry::new("txn-count", "TXN-COUNT")
        .value(ValueType::Number)
        .args(0, Some(0))
        .doc("Number of transactions on the server session."),
];

// ============================================================
// Operators
// ============================================================

const HEADER_OPS: (Option<&str>, &str) = (Some("add-header"), "rm-header");
const COOKIE_OPS: (Option<&str>, &str) = (Some("add-cookie"), "rm-cookie");

/// Assignment targets
pub static OPERATORS: &[SymbolEntry] = &[
    SymbolEntry::new("http.cntl.", "set-http-cntl")
        .value(ValueType::Bool)
        .sections(HTTP)
        .suffixes(SuffixGroup::HttpCntl)
        .doc("Set a transaction control flag."),
    SymbolEntry::new("http.status.reason", "set-status-reason")
        .sections(HTTP)
        .skip()
        .doc("Set the reason phrase of the response."),
    SymbolEntry::new("http.status", "set-status")
        .value(ValueType::Number)
        .sections(HTTP)
        .skip()
        .doc("Set the response status code."),
    SymbolEntry::new("inbound.conn.dscp", "set-conn-dscp")
        .value(ValueType::Number)
        .sections(HTTP)
        .doc("Set the DSCP value of the client connection."),
    SymbolEntry::new("inbound.conn.mark", "set-conn-mark")
        .value(ValueType::Number)
        .sections(HTTP)
        .doc("Set the netfilter mark of the client connection."),
    SymbolEntry::new("outbound.conn.dscp", "set-conn-dscp")
        .value(ValueType::Number)
        .sections(SectionSet::PRE_ORIGIN)
        .skip()
        .doc("Set the DSCP value of the origin connection."),
    SymbolEntry::new("outbound.conn.mark", "set-conn-mark")
        .value(ValueType::Number)
        .sections(SectionSet::PRE_ORIGIN)
        .skip()
        .doc("Set the netfilter mark of the origin connection."),
    SymbolEntry::new("inbound.cookie.", "set-cookie")
        .sections(HTTP)
        .family(COOKIE_OPS.0, COOKIE_OPS.1)
        .doc("Set, append or remove a client cookie."),
    SymbolEntry::new("outbound.cookie.", "set-cookie")
        .sections(UPSTREAM)
        .family(COOKIE_OPS.0, COOKIE_OPS.1)
        .skip()
        .doc("Set, append or remove a cookie on the origin request."),
    SymbolEntry::new("inbound.req.", "set-header")
        .sections(HTTP)
        .family(HEADER_OPS.0, HEADER_OPS.1)
        .context()
        .doc("Set, append or remove a client request header."),
    SymbolEntry::new("inbound.resp.body", "set-body")
        .sections(HTTP)
        .doc("Replace the response body."),
    SymbolEntry::new("inbound.resp.", "set-header")
        .sections(SectionSet::CLIENT_RESPONSE)
        .family(HEADER_OPS.0, HEADER_OPS.1)
        .context()
        .doc("Set, append or remove a header of the response to the client."),
    SymbolEntry::new("inbound.status.reason", "set-status-reason")
        .sections(HTTP)
        .doc("Set the reason phrase of the response."),
    SymbolEntry::new("inbound.status", "set-status")
        .value(ValueType::Number)
        .sections(HTTP)
        .doc("Set the response status code."),
    SymbolEntry::new("inbound.url.", "set-destination")
        .sections(HTTP)
        .suffixes(SuffixGroup::Url)
        .family(None, "rm-destination")
        .doc("Rewrite or remove a component of the request URL."),
    SymbolEntry::new("outbound.req.", "set-header")
        .sections(EARLY)
        .family(HEADER_OPS.0, HEADER_OPS.1)
        .context()
        .doc("Set, append or remove a header on the origin request."),
    SymbolEntry::new("outbound.resp.", "set-header")
        .sections(UPSTREAM)
        .family(HEADER_OPS.0, HEADER_OPS.1)
        .context()
        .doc("Set, append or remove a header on the origin response."),
    SymbolEntry::new("outbound.status.reason", "set-status-reason")
        .sections(UPSTREAM)
        .skip()
        .doc("Set the reason phrase of the origin response."),
    SymbolEntry::new("outbound.status", "set-status")
        .value(ValueType::Number)
        .sections(UPSTREAM)
        .skip()
        .doc("Set the origin response status code."),
    SymbolEntry::new("outbound.url.", "set-destination")
        .sections(EARLY)
        .suffixes(SuffixGroup::Url)
        .family(None, "rm-destination")
        .skip()
        .doc("Rewrite or remove a component of the next-hop URL."),
];

/// Statement functions, called as `name(args);`
pub static STATEMENTS: &[SymbolEntry] = &[
    SymbolEntry::new("add-header", "add-header")
        .sections(HTTP)
        .args(2, Some(2))
        .skip()
        .doc("Append a header value."),
    SymbolEntry::new("counter", "counter")
        .args(1, Some(1))
        .doc("Increment a named statistics counter."),
    SymbolEntry::new("set-debug", "set-debug")
        .args(0, Some(0))
        .doc("Enable debug logging for this transaction."),
    SymbolEntry::new("no-op", "no-op")
        .args(0, Some(0))
        .doc("Do nothing."),
    SymbolEntry::new("remove_query", "rm-destination")
        .payload("QUERY")
        .sections(HTTP)
        .args(1, Some(1))
        .context()
        .doc("Remove the listed query parameters."),
    SymbolEntry::new("keep_query", "rm-destination")
        .payload("QUERY")
        .sections(HTTP)
        .args(1, Some(1))
        .context()
        .doc("Remove every query parameter except the listed ones."),
    SymbolEntry::new("run-plugin", "run-plugin")
        .sections(HTTP)
        .args(1, None)
        .doc("Run a remap plugin with the given arguments."),
    SymbolEntry::new("set-body-from", "set-body-from")
        .sections(HTTP)
        .args(1, Some(1))
        .doc("Replace the response body with the content fetched from a URL."),
    SymbolEntry::new("set-cc-alg", "set-cc-alg")
        .sections(HTTP)
        .args(1, Some(1))
        .doc("Set the TCP congestion control algorithm."),
    SymbolEntry::new("set-config", "set-config")
        .sections(HTTP)
        .args(2, Some(2))
        .doc("Override a configuration variable for this transaction."),
    SymbolEntry::new("set-effective-address", "set-effective-address")
        .sections(HTTP)
        .args(1, Some(1))
        .doc("Set the client address used by later processing."),
    SymbolEntry::new("set-redirect", "set-redirect")
        .sections(HTTP)
        .args(2, Some(2))
        .doc("Respond with a redirect to the given URL."),
    SymbolEntry::new("skip-remap", "skip-remap")
        .sections(SectionSet::of(&[SectionType::PreRemap, SectionType::ReadRequest]))
        .args(0, Some(1))
        .doc("Skip remap processing for this transaction."),
    SymbolEntry::new("set-plugin-cntl", "set-plugin-cntl")
        .sections(HTTP)
        .args(2, Some(2))
        .doc("Set a plugin control value."),
];

// ============================================================
// Hand-curated ambiguity
// ============================================================

/// A native tag whose DSL spelling depends on the enclosing section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmbiguousTag {
    pub tag: &'static str,
    pub outbound_sections: SectionSet,
    pub outbound: &'static str,
    pub inbound: &'static str,
}

pub static AMBIGUOUS_TAGS: &[AmbiguousTag] = &[
    AmbiguousTag {
        tag: "METHOD",
        outbound_sections: SectionSet::of(&[SectionType::SendRequest]),
        outbound: "outbound.method",
        inbound: "inbound.method",
    },
    AmbiguousTag {
        tag: "STATUS",
        outbound_sections: SectionSet::of(&[SectionType::ReadResponse]),
        outbound: "outbound.status",
        inbound: "inbound.status",
    },
];

/// Which header namespace `%{HEADER:..}` reads in each section
pub static HEADER_CONDITION_CONTEXT: &[(SectionType, &str)] = &[
    (SectionType::PreRemap, "outbound.req."),
    (SectionType::Remap, "outbound.req."),
    (SectionType::ReadRequest, "outbound.req."),
    (SectionType::SendRequest, "outbound.req."),
    (SectionType::ReadResponse, "outbound.resp."),
    (SectionType::SendResponse, "inbound.resp."),
    (SectionType::TxnClose, "inbound.resp."),
];

/// Which header namespace `set-header` and friends write in each section
pub static HEADER_OPERATOR_CONTEXT: &[(SectionType, &str)] = &[
    (SectionType::PreRemap, "inbound.req."),
    (SectionType::Remap, "inbound.req."),
    (SectionType::ReadRequest, "inbound.req."),
    (SectionType::SendRequest, "outbound.req."),
    (SectionType::ReadResponse, "outbound.resp."),
    (SectionType::SendResponse, "inbound.resp."),
    (SectionType::TxnClose, "inbound.resp."),
];
