use url::Url;

use crate::errors::FetchError;

/// Which underlying client implementation handles the call.
///
/// This is a routing heuristic, not a certificate or negotiation decision:
/// it only picks the plain or the TLS connector inside the platform client,
/// by fixing the scheme of the URL that gets handed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plain,
    Encrypted,
}

impl Transport {
    /// Encrypted transport is selected when the scheme is `https`, the
    /// effective port is 443 (numeric or textual), or the protocol field
    /// names the secure protocol. Everything else goes over plain transport.
    pub fn select(scheme: Option<&str>, port: Option<&PortSpec>, protocol: Option<&str>) -> Self {
        let secure_scheme = matches!(scheme, Some("https"));
        let secure_port = port.is_some_and(PortSpec::is_secure_default);
        let secure_protocol =
            protocol.is_some_and(|p| p.eq_ignore_ascii_case("https") || p.eq_ignore_ascii_case("https:"));

        if secure_scheme || secure_port || secure_protocol {
            Transport::Encrypted
        } else {
            Transport::Plain
        }
    }

    pub fn scheme(self) -> &'static str {
        match self {
            Transport::Plain => "http",
            Transport::Encrypted => "https",
        }
    }
}

/// A port given either numerically or as text, the way loosely-typed request
/// options tend to carry it. A textual port that is not a number fails at
/// resolve time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSpec {
    Number(u16),
    Text(String),
}

impl PortSpec {
    fn is_secure_default(&self) -> bool {
        match self {
            PortSpec::Number(n) => *n == 443,
            PortSpec::Text(s) => s.trim() == "443",
        }
    }
}

impl From<u16> for PortSpec {
    fn from(n: u16) -> Self {
        PortSpec::Number(n)
    }
}

impl From<&str> for PortSpec {
    fn from(s: &str) -> Self {
        PortSpec::Text(s.to_string())
    }
}

impl std::fmt::Display for PortSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortSpec::Number(n) => write!(f, "{n}"),
            PortSpec::Text(s) => f.write_str(s.trim()),
        }
    }
}

/// Structured request target, mirroring the usual host/port/path option
/// conventions of platform HTTP clients.
#[derive(Debug, Clone, Default)]
pub struct Parts {
    /// Protocol field, e.g. `"https"` or `"https:"`. Feeds transport selection.
    pub protocol: Option<String>,
    pub host: String,
    pub port: Option<PortSpec>,
    /// Defaults to `/` when absent.
    pub path: Option<String>,
}

impl Parts {
    pub fn new(host: impl Into<String>) -> Self {
        Parts {
            host: host.into(),
            ..Parts::default()
        }
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = Some(protocol.into());
        self
    }

    pub fn port(mut self, port: impl Into<PortSpec>) -> Self {
        self.port = Some(port.into());
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

/// A request target: a raw URL string, an already-parsed URL, or structured
/// parts. Resolution decides the transport and produces the concrete URL the
/// platform client is handed.
#[derive(Debug, Clone)]
pub enum Target {
    Raw(String),
    Url(Url),
    Parts(Parts),
}

impl Target {
    pub fn resolve(self) -> Result<(Transport, Url), FetchError> {
        match self {
            Target::Raw(raw) => {
                let url = Url::parse(&raw)?;
                Self::resolve_url(url)
            }
            Target::Url(url) => Self::resolve_url(url),
            Target::Parts(parts) => {
                let transport =
                    Transport::select(None, parts.port.as_ref(), parts.protocol.as_deref());

                let mut raw = format!("{}://{}", transport.scheme(), parts.host);
                if let Some(port) = &parts.port {
                    raw.push(':');
                    raw.push_str(&port.to_string());
                }
                let path = parts.path.as_deref().unwrap_or("/");
                if !path.starts_with('/') {
                    raw.push('/');
                }
                raw.push_str(path);

                let url = Url::parse(&raw)?;
                Ok((transport, url))
            }
        }
    }

    fn resolve_url(mut url: Url) -> Result<(Transport, Url), FetchError> {
        // The platform client only speaks http and https; anything else is
        // rejected up front rather than silently rewritten.
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FetchError::Scheme(url.scheme().to_string()));
        }

        let port = url.port().map(PortSpec::Number);
        let transport = Transport::select(Some(url.scheme()), port.as_ref(), None);

        // An http URL with port 443 still goes over the encrypted transport,
        // so the scheme has to follow the selection. http <-> https swaps
        // always succeed.
        if url.scheme() != transport.scheme() {
            let _ = url.set_scheme(transport.scheme());
        }

        Ok((transport, url))
    }
}

impl From<&str> for Target {
    fn from(s: &str) -> Self {
        Target::Raw(s.to_string())
    }
}

impl From<String> for Target {
    fn from(s: String) -> Self {
        Target::Raw(s)
    }
}

impl From<Url> for Target {
    fn from(url: Url) -> Self {
        Target::Url(url)
    }
}

impl From<Parts> for Target {
    fn from(parts: Parts) -> Self {
        Target::Parts(parts)
    }
}
