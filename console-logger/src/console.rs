use nu_ansi_term::Color::{Cyan, Red};
use std::io::{self, Write};

/// Print info on console. Goes to stderr so that stdout stays machine readable.
pub fn info(message: &str) {
    eprintln!("{}", Cyan.bold().italic().paint(message));
}

/// Print warning on console, with the offending data highlighted.
pub fn warn(message: &str, data: &str) {
    eprintln!(
        "{} \n {} ",
        Cyan.bold().italic().paint(message),
        Red.bold().italic().paint(data)
    );
}

/// Print command output or generated documents on stdout, verbatim and uncoloured.
pub fn output(data: &str) -> io::Result<()> {
    write_output(&mut io::stdout().lock(), data)
}

fn write_output<W: Write>(writer: &mut W, data: &str) -> io::Result<()> {
    writer.write_all(data.as_bytes())?;
    if !data.ends_with('\n') {
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::write_output;
    use std::io::{self, Write};

    #[test]
    fn output_ends_with_a_newline() {
        let mut written = Vec::new();
        write_output(&mut written, "kind: ConfigMap").unwrap();
        write_output(&mut written, "kind: Secret\n").unwrap();
        assert_eq!(written, b"kind: ConfigMap\nkind: Secret\n");
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_are_returned() {
        let error = write_output(&mut ClosedPipe, "kind: ConfigMap").unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }
}
