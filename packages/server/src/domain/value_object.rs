//! 値オブジェクト
//!
//! ルーム ID、ユーザー名、セッション ID、タイムスタンプを表現します。

use std::fmt;

use uuid::Uuid;

use super::error::ValueObjectError;

/// メッセージログのキー接頭辞（外部ツールが依存するため変更不可）
const LOG_KEY_PREFIX: &str = "chat:";
/// プレゼンスストアのキー接頭辞（外部ツールが依存するため変更不可）
const PRESENCE_KEY_PREFIX: &str = "presence:";

/// ユーザー名が指定されなかった場合の表示名
pub const ANONYMOUS_USERNAME: &str = "anonymous";

/// Room ID
///
/// 永続化されるエンティティではなく、Session Registry やプレゼンスストアに
/// キーとして現れることで暗黙的に存在します。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomId(String);

impl RoomId {
    /// 新しい RoomId を作成（空文字列は不可）
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::RoomIdEmpty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// メッセージログ上のキー（`chat:<room>`）
    pub fn log_key(&self) -> String {
        format!("{}{}", LOG_KEY_PREFIX, self.0)
    }

    /// プレゼンスストア上のキー（`presence:<room>`）
    pub fn presence_key(&self) -> String {
        format!("{}{}", PRESENCE_KEY_PREFIX, self.0)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ユーザー名（表示名）
///
/// 接続時にクライアントが自己申告する名前で、本人確認は行いません。
/// 複数の接続が同じ名前を名乗ることもあります。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    /// 新しい Username を作成（空文字列は不可）
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::UsernameEmpty);
        }
        Ok(Self(value))
    }

    /// `"anonymous"`
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_USERNAME.to_string())
    }

    /// 接続クエリの `username` から作成
    ///
    /// 指定なし、または空文字列の場合は `"anonymous"` になります。
    pub fn from_query(value: Option<String>) -> Self {
        value
            .and_then(|name| Self::new(name).ok())
            .unwrap_or_else(Self::anonymous)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Session ID
///
/// トランスポート上の接続 1 本を識別します。再接続は常に新しい ID になります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// 新しい SessionId を生成（UUID v4）
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Unix タイムスタンプ（ミリ秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
