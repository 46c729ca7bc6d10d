//! Driver for an external SMT-LIB 2 solver process.
//!
//! The solver runs as a child process (`z3 -in` by default) with a reader
//! thread feeding stdout lines through a channel, so every read honors the
//! wall-clock deadline. `kill` is safe at any point, including mid-solve;
//! the bounded-search driver uses it for cancellation.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use log::debug;

use super::errors::SolverError;
use super::model::{is_complete_response, parse_values, SmtValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtResult {
    Sat,
    Unsat,
    Unknown,
}

#[derive(Debug)]
pub struct SmtSolver {
    child: Child,
    stdin: ChildStdin,
    lines: Receiver<String>,
    deadline: Option<Instant>,
}

impl SmtSolver {
    /// Spawn the solver from a whitespace-separated command line.
    pub fn spawn(command_line: &str) -> Result<Self, SolverError> {
        let mut parts = command_line.split_whitespace();
        let program = parts.next().ok_or_else(|| SolverError::Spawn {
            command: command_line.to_string(),
            message: "empty solver command".to_string(),
        })?;
        let mut child = Command::new(program)
            .args(parts)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SolverError::Spawn {
                command: command_line.to_string(),
                message: e.to_string(),
            })?;

        let stdin = child.stdin.take().ok_or_else(|| SolverError::Spawn {
            command: command_line.to_string(),
            message: "no stdin handle".to_string(),
        })?;
        let stdout = child.stdout.take().ok_or_else(|| SolverError::Spawn {
            command: command_line.to_string(),
            message: "no stdout handle".to_string(),
        })?;

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(SmtSolver {
            child,
            stdin,
            lines: rx,
            deadline: None,
        })
    }

    /// All reads after this instant fail with `Timeout`.
    pub fn set_deadline(&mut self, deadline: Option<Instant>) {
        self.deadline = deadline;
    }

    fn remaining(&self) -> Result<Option<Duration>, SolverError> {
        match self.deadline {
            None => Ok(None),
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    Err(SolverError::Timeout)
                } else {
                    Ok(Some(deadline - now))
                }
            }
        }
    }

    /// Send one line of SMT-LIB to the solver.
    pub fn send(&mut self, line: &str) -> Result<(), SolverError> {
        writeln!(self.stdin, "{}", line).map_err(|e| SolverError::Io(e.to_string()))?;
        self.stdin
            .flush()
            .map_err(|e| SolverError::Io(e.to_string()))
    }

    fn read_line(&mut self) -> Result<String, SolverError> {
        match self.remaining()? {
            None => self.lines.recv().map_err(|_| SolverError::ClosedStream),
            Some(timeout) => match self.lines.recv_timeout(timeout) {
                Ok(line) => Ok(line),
                Err(RecvTimeoutError::Timeout) => {
                    self.kill();
                    Err(SolverError::Timeout)
                }
                Err(RecvTimeoutError::Disconnected) => Err(SolverError::ClosedStream),
            },
        }
    }

    /// `(check-sat)` and wait for the answer.
    pub fn check_sat(&mut self) -> Result<SmtResult, SolverError> {
        self.send("(check-sat)")?;
        let line = self.read_line()?;
        debug!("solver answered: {}", line);
        match line.trim() {
            "sat" => Ok(SmtResult::Sat),
            "unsat" => Ok(SmtResult::Unsat),
            "unknown" => Ok(SmtResult::Unknown),
            other => Err(SolverError::Unexpected(other.to_string())),
        }
    }

    /// `(get-value (e1 … en))`; values come back in request order.
    pub fn get_values(&mut self, exprs: &[String]) -> Result<Vec<SmtValue>, SolverError> {
        if exprs.is_empty() {
            return Ok(Vec::new());
        }
        let mut command = String::from("(get-value (");
        for (idx, expr) in exprs.iter().enumerate() {
            if idx > 0 {
                command.push(' ');
            }
            command.push_str(expr);
        }
        command.push_str("))");
        self.send(&command)?;

        let mut response = String::new();
        loop {
            let line = self.read_line()?;
            response.push_str(&line);
            response.push('\n');
            if is_complete_response(&response) {
                break;
            }
        }
        parse_values(&response)
    }

    pub fn kill(&mut self) {
        let _ = self.child.kill();
    }
}

impl Drop for SmtSolver {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests exercise the real solver binary and are skipped unless one
    // is installed.

    fn z3_available() -> bool {
        Command::new("z3")
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    #[test]
    #[ignore = "requires a z3 binary on PATH"]
    fn test_check_sat_roundtrip() {
        if !z3_available() {
            return;
        }
        let mut solver = SmtSolver::spawn("z3 -in").unwrap();
        solver.send("(declare-const x Int)").unwrap();
        solver.send("(assert (> x 5))").unwrap();
        assert_eq!(solver.check_sat().unwrap(), SmtResult::Sat);
        let values = solver.get_values(&["x".to_string()]).unwrap();
        assert!(values[0].as_int() > 5);
    }

    #[test]
    #[ignore = "requires a z3 binary on PATH"]
    fn test_unsat() {
        if !z3_available() {
            return;
        }
        let mut solver = SmtSolver::spawn("z3 -in").unwrap();
        solver.send("(declare-const x Int)").unwrap();
        solver.send("(assert (and (> x 5) (< x 5)))").unwrap();
        assert_eq!(solver.check_sat().unwrap(), SmtResult::Unsat);
    }

    #[test]
    fn test_spawn_failure_is_reported() {
        let err = SmtSolver::spawn("definitely-not-a-solver-binary -in").unwrap_err();
        assert!(matches!(err, SolverError::Spawn { .. }));
    }
}
