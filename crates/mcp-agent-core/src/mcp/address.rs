//! Tool server addresses

use std::fmt;
use std::str::FromStr;

use super::error::{McpError, McpResult};

/// Where a tool provider process lives
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerAddress {
    /// Local subprocess spoken to over stdin/stdout
    Stdio { command: String, args: Vec<String> },
    /// Streamable HTTP endpoint
    Http { url: String },
}

impl ServerAddress {
    /// Parse an address string
    ///
    /// `http://` and `https://` URLs are HTTP endpoints; anything else is a
    /// command line split on whitespace, e.g. `python mcpdemo.py`.
    pub fn parse(raw: &str) -> McpResult<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(McpError::InvalidAddress("empty address".to_string()));
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(Self::http(raw));
        }

        let mut parts = raw.split_whitespace().map(str::to_string);
        let command = parts
            .next()
            .ok_or_else(|| McpError::InvalidAddress(raw.to_string()))?;
        Ok(Self::Stdio {
            command,
            args: parts.collect(),
        })
    }

    /// Stdio address from a command and its arguments
    pub fn stdio<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Stdio {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// HTTP address
    pub fn http(url: impl Into<String>) -> Self {
        Self::Http { url: url.into() }
    }

    pub fn is_stdio(&self) -> bool {
        matches!(self, Self::Stdio { .. })
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio { command, args } if args.is_empty() => write!(f, "{}", command),
            Self::Stdio { command, args } => write!(f, "{} {}", command, args.join(" ")),
            Self::Http { url } => write!(f, "{}", url),
        }
    }
}

impl FromStr for ServerAddress {
    type Err = McpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stdio() {
        let addr = ServerAddress::parse("python mcpdemo.py").unwrap();
        assert_eq!(addr, ServerAddress::stdio("python", ["mcpdemo.py"]));
        assert!(addr.is_stdio());
        assert_eq!(addr.to_string(), "python mcpdemo.py");
    }

    #[test]
    fn test_parse_http() {
        let addr: ServerAddress = "https://notes.example.com/mcp".parse().unwrap();
        assert_eq!(addr, ServerAddress::http("https://notes.example.com/mcp"));
        assert!(!addr.is_stdio());
    }

    #[test]
    fn test_parse_trims_and_splits() {
        let addr = ServerAddress::parse("  uv  run   server.py ").unwrap();
        assert_eq!(addr, ServerAddress::stdio("uv", ["run", "server.py"]));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            ServerAddress::parse("   "),
            Err(McpError::InvalidAddress(_))
        ));
    }
}
