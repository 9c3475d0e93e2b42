/// Process-wide assistant instruction, sent as the system turn of every
/// generation call.
pub const SYSTEM_INSTRUCTION: &str = "あなたは会議の議事録とフォローアップメールの作成アシスタントです。わかりやすく構造化された形式で回答してください。";

/// Used when the upload carries no custom minutes prompt.
pub const DEFAULT_MINUTES_PROMPT: &str = "以下の会議の文字起こしから、議題・決定事項・ToDo をまとめた議事録を作成してください。";

/// Used when the upload carries no custom email prompt.
pub const DEFAULT_EMAIL_PROMPT: &str = "以下の議事録をもとに、参加者へ送るフォローアップメールの下書きを作成してください。";
