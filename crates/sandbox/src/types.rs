pub struct ExecRequest<'a> {
    pub cmd: &'a str,
}

/// Buffered output of one completed process. stdout/stderr are captured
/// while the process runs and read back once it exits.
pub struct ExecOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}
