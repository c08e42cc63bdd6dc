//! The batch file driver (an external collaborator — see crate docs):
//! read a whole source file, emit it in full, and evaluate from pc 0.

use std::fs;
use std::path::Path;

use crate::error::Error;
use crate::stdlib::install_standard_namespace;
use crate::vm::Vm;

/// A failure either reading the file off disk, or from one of the
/// three language error families while compiling/running it.
pub enum DriverError {
    Io(std::io::Error),
    Lang(Error),
}

impl From<Error> for DriverError {
    fn from(e: Error) -> Self {
        DriverError::Lang(e)
    }
}

/// Run the file at `path` to completion. `trace` turns the VM's trace
/// flag on before any source is emitted. Returns the source text
/// alongside any language error, so the caller can render a
/// position-anchored diagnostic against it.
pub fn run_file(path: &Path, trace: bool) -> Result<(), (String, DriverError)> {
    let source = fs::read_to_string(path).map_err(|e| (String::new(), DriverError::Io(e)))?;

    let ns = install_standard_namespace();
    let mut vm = Vm::new();
    vm.trace = trace;

    let source_name = path.display().to_string();
    crate::run_source(&mut vm, &ns, &source, &source_name)
        .map_err(|e| (source.clone(), DriverError::Lang(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn runs_a_simple_file_to_completion() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "(+ 1 2)").unwrap();
        let result = run_file(file.path(), false);
        assert!(result.is_ok());
    }

    #[test]
    fn missing_file_reports_io_error() {
        let result = run_file(Path::new("/nonexistent/path/to/nowhere.weft"), false);
        match result {
            Err((_, DriverError::Io(_))) => {}
            other => panic!("expected an Io error, got {}", other.is_ok()),
        }
    }
}
