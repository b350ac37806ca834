/// Creation-time description of one sandbox session.
///
/// `id` is minted by the caller and must be unique among live sessions;
/// providers tag the remote environment with it so orphans can be traced.
pub struct SessionSpec {
    pub id: String,
    pub language: String,
    /// Environment variables to apply when the sandbox comes up.
    pub env: Vec<(String, String)>,
}
