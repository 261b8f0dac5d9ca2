//! Command-line front end.

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
};

use crate::{backend::Backend, resolver::Resolver};

pub const USAGE: &str = "\
Usage:
  --resolve <hostname>          Resolve a single hostname to IP addresses
  --batch <file>                Resolve multiple hostnames from a file
  --reverse <ip_address>        Perform a reverse DNS lookup
  --verify <ip_address>         Perform a reverse DNS lookup confirmed by a forward lookup
  --help                        Show this message
";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Resolve(String),
    Batch(PathBuf),
    Reverse(String),
    Verify(String),
    Help,
}

/// Reasons the command line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No option was given, or an option is missing its operand.
    MissingArgument,
    /// The first argument is not a known option.
    UnknownOption(String),
}

impl Command {
    /// Parses the arguments following the program name.
    ///
    /// Only the first two arguments are considered; anything after the operand is ignored.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, ParseError> {
        let (option, operand) = match args {
            [] => return Err(ParseError::MissingArgument),
            [option] => (option.as_ref(), None),
            [option, operand, ..] => (option.as_ref(), Some(operand.as_ref().to_string())),
        };

        // Unknown options are reported even when the operand is missing.
        let cmd: fn(String) -> Command = match option {
            "--help" => return Ok(Command::Help),
            "--resolve" => Command::Resolve,
            "--batch" => |path| Command::Batch(PathBuf::from(path)),
            "--reverse" => Command::Reverse,
            "--verify" => Command::Verify,
            _ => return Err(ParseError::UnknownOption(option.to_string())),
        };
        operand.map(cmd).ok_or(ParseError::MissingArgument)
    }
}

/// Reads newline-separated host names, skipping blank lines.
pub fn read_hostnames(reader: impl BufRead) -> io::Result<Vec<String>> {
    let mut hostnames = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let host = line.trim();
        if !host.is_empty() {
            hostnames.push(host.to_string());
        }
    }
    Ok(hostnames)
}

/// Runs the program with the arguments following the program name.
///
/// Returns the process exit code.
pub fn main<B: Backend, S: AsRef<str>>(
    args: &[S],
    resolver: &Resolver<B>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<i32> {
    match Command::parse(args) {
        Ok(cmd) => run(&cmd, resolver, out, err),
        Err(ParseError::MissingArgument) => {
            out.write_all(USAGE.as_bytes())?;
            Ok(1)
        }
        Err(ParseError::UnknownOption(option)) => {
            writeln!(err, "Unknown option: {}", option)?;
            out.write_all(USAGE.as_bytes())?;
            Ok(1)
        }
    }
}

/// Executes `cmd`, writing results to `out` and failures to `err`.
///
/// Returns the process exit code.
pub fn run<B: Backend>(
    cmd: &Command,
    resolver: &Resolver<B>,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<i32> {
    match cmd {
        Command::Help => {
            out.write_all(USAGE.as_bytes())?;
        }
        Command::Resolve(host) => {
            let addrs = resolver.resolve(host);
            if addrs.is_empty() {
                writeln!(err, "No IP addresses found for {}", host)?;
                return Ok(1);
            }
            writeln!(out, "Resolved IPs for {}:", host)?;
            for ip in addrs {
                writeln!(out, "  {}", ip)?;
            }
        }
        Command::Batch(path) => {
            let hostnames = match File::open(path).and_then(|f| read_hostnames(BufReader::new(f)))
            {
                Ok(hostnames) => hostnames,
                Err(e) => {
                    log::debug!("reading {}: {}", path.display(), e);
                    writeln!(err, "Error: Cannot open file {}", path.display())?;
                    return Ok(1);
                }
            };

            let results = resolver.resolve_batch(&hostnames);
            for (host, addrs) in hostnames.iter().zip(&results) {
                writeln!(out, "Resolved IPs for {}:", host)?;
                if addrs.is_empty() {
                    writeln!(out, "  (No IP addresses found)")?;
                }
                for ip in addrs {
                    writeln!(out, "  {}", ip)?;
                }
            }
        }
        Command::Reverse(addr) => {
            let name = resolver.reverse_lookup(addr);
            if name.is_empty() {
                writeln!(err, "No hostname found for IP address: {}", addr)?;
                return Ok(1);
            }
            writeln!(out, "Resolved hostname for {}: {}", addr, name)?;
        }
        Command::Verify(addr) => {
            let name = resolver.reverse_lookup_verified(addr);
            if name.is_empty() {
                writeln!(err, "No verified hostname for IP address: {}", addr)?;
                return Ok(1);
            }
            writeln!(out, "Verified hostname for {}: {}", addr, name)?;
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{diag::MemorySink, mock::MockBackend};
    use expect_test::{expect, Expect};
    use std::{fs, sync::Arc};

    fn backend() -> MockBackend {
        MockBackend::new()
            .host("example.test", &["93.184.216.34", "2001:db8::10"])
            .host("b.test", &["10.0.0.1"])
            .name("93.184.216.34", "example.test")
            .name("10.9.9.9", "elsewhere.test")
    }

    fn check(args: &[&str], code: i32, stdout: Expect, stderr: Expect) {
        let backend = backend();
        let resolver = Resolver::builder()
            .diagnostics(Arc::new(MemorySink::new()))
            .build_with(&backend);
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let actual = main(args, &resolver, &mut out, &mut err).unwrap();
        stdout.assert_eq(&String::from_utf8(out).unwrap());
        stderr.assert_eq(&String::from_utf8(err).unwrap());
        assert_eq!(actual, code);
    }

    #[test]
    fn parse() {
        assert_eq!(
            Command::parse(&["--resolve", "a.test"]),
            Ok(Command::Resolve("a.test".into()))
        );
        assert_eq!(
            Command::parse(&["--batch", "hosts.txt", "extra"]),
            Ok(Command::Batch("hosts.txt".into()))
        );
        assert_eq!(Command::parse(&["--help"]), Ok(Command::Help));
        assert_eq!(Command::parse(&["--help", "x"]), Ok(Command::Help));
        assert_eq!(
            Command::parse::<&str>(&[]),
            Err(ParseError::MissingArgument)
        );
        assert_eq!(
            Command::parse(&["--reverse"]),
            Err(ParseError::MissingArgument)
        );
        assert_eq!(
            Command::parse(&["--frobnicate"]),
            Err(ParseError::UnknownOption("--frobnicate".into()))
        );
    }

    #[test]
    fn hostnames_skip_blank_lines() {
        let input = "a.test\n\n  b.test \r\n\t\nc.test";
        assert_eq!(
            read_hostnames(input.as_bytes()).unwrap(),
            ["a.test", "b.test", "c.test"]
        );
    }

    #[test]
    fn resolve() {
        check(
            &["--resolve", "example.test"],
            0,
            expect![[r#"
                Resolved IPs for example.test:
                  93.184.216.34
                  2001:db8::10
            "#]],
            expect![""],
        );
        check(
            &["--resolve", "nowhere.test"],
            1,
            expect![""],
            expect![[r#"
                No IP addresses found for nowhere.test
            "#]],
        );
    }

    #[test]
    fn batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts.txt");
        fs::write(&path, "a.test\n\nb.test\nexample.test\n").unwrap();

        check(
            &["--batch", path.to_str().unwrap()],
            0,
            expect![[r#"
                Resolved IPs for a.test:
                  (No IP addresses found)
                Resolved IPs for b.test:
                  10.0.0.1
                Resolved IPs for example.test:
                  93.184.216.34
                  2001:db8::10
            "#]],
            expect![""],
        );
    }

    #[test]
    fn batch_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        let backend = backend();
        let resolver = Resolver::builder()
            .diagnostics(Arc::new(MemorySink::new()))
            .build_with(&backend);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let code = run(&Command::Batch(path.clone()), &resolver, &mut out, &mut err).unwrap();
        assert_eq!(code, 1);
        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            format!("Error: Cannot open file {}\n", path.display())
        );
    }

    #[test]
    fn reverse() {
        check(
            &["--reverse", "93.184.216.34"],
            0,
            expect![[r#"
                Resolved hostname for 93.184.216.34: example.test
            "#]],
            expect![""],
        );
        check(
            &["--reverse", "256.1.1.1"],
            1,
            expect![""],
            expect![[r#"
                No hostname found for IP address: 256.1.1.1
            "#]],
        );
    }

    #[test]
    fn verify() {
        check(
            &["--verify", "93.184.216.34"],
            0,
            expect![[r#"
                Verified hostname for 93.184.216.34: example.test
            "#]],
            expect![""],
        );
        check(
            &["--verify", "10.9.9.9"],
            1,
            expect![""],
            expect![[r#"
                No verified hostname for IP address: 10.9.9.9
            "#]],
        );
    }

    #[test]
    fn usage() {
        check(
            &["--help"],
            0,
            expect![[r#"
                Usage:
                  --resolve <hostname>          Resolve a single hostname to IP addresses
                  --batch <file>                Resolve multiple hostnames from a file
                  --reverse <ip_address>        Perform a reverse DNS lookup
                  --verify <ip_address>         Perform a reverse DNS lookup confirmed by a forward lookup
                  --help                        Show this message
            "#]],
            expect![""],
        );
        check(
            &["--resolve"],
            1,
            expect![[r#"
                Usage:
                  --resolve <hostname>          Resolve a single hostname to IP addresses
                  --batch <file>                Resolve multiple hostnames from a file
                  --reverse <ip_address>        Perform a reverse DNS lookup
                  --verify <ip_address>         Perform a reverse DNS lookup confirmed by a forward lookup
                  --help                        Show this message
            "#]],
            expect![""],
        );
    }

    #[test]
    fn unknown_option() {
        let backend = backend();
        let resolver = Resolver::builder()
            .diagnostics(Arc::new(MemorySink::new()))
            .build_with(&backend);
        let (mut out, mut err) = (Vec::new(), Vec::new());

        let code = main(&["-x", "y"], &resolver, &mut out, &mut err).unwrap();
        assert_eq!(code, 1);
        assert_eq!(String::from_utf8(err).unwrap(), "Unknown option: -x\n");
        assert_eq!(String::from_utf8(out).unwrap(), USAGE);
    }
}
