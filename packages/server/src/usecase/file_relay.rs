//! UseCase: ファイル中継
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - FileRelayUseCase::relay() メソッド
//!
//! ### なぜこのテストが必要か
//! - 元のファイルと加工済みファイルが正しい名前・内容で保存されることを保証
//! - 保存に失敗した場合に加工済みファイルを作らないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：テキストファイルのアップロード
//! - 異常系：ストレージへの書き込み失敗

use std::sync::Arc;

use crate::domain::{FileArtifact, FileStore};

use super::error::FileRelayError;

/// Appended to every uploaded file before it is offered back.
pub const SERVER_APPENDED_LINE: &str = "\nThis is an added line from the server.";

/// Name prefix of the modified copy.
pub const MODIFIED_PREFIX: &str = "modified_";

/// ファイル中継のユースケース
pub struct FileRelayUseCase {
    store: Arc<dyn FileStore>,
    /// 公開 URL（例: `http://localhost:8080`）
    public_url: String,
}

impl FileRelayUseCase {
    pub fn new(store: Arc<dyn FileStore>, public_url: impl Into<String>) -> Self {
        let public_url = public_url.into().trim_end_matches('/').to_string();
        Self { store, public_url }
    }

    /// 元のファイルを保存し、1 行追加した加工済みファイルを保存する
    ///
    /// `filename` はディレクトリを含まない単純なファイル名であること
    /// （デコード時に検証済み）。
    ///
    /// # Returns
    ///
    /// * `Ok(FileArtifact)` - 加工済みファイルの名前・内容・取得 URL
    /// * `Err(FileRelayError)` - 保存失敗（再試行はしない）
    pub async fn relay(&self, filename: &str, data: Vec<u8>) -> Result<FileArtifact, FileRelayError> {
        // 1. 元のファイルを保存
        self.store.write(filename, &data).await?;

        // 2. サーバーからの 1 行を追加
        let mut content = data;
        content.extend_from_slice(SERVER_APPENDED_LINE.as_bytes());

        // 3. 加工済みファイルを保存
        let modified = format!("{}{}", MODIFIED_PREFIX, filename);
        self.store.write(&modified, &content).await?;

        tracing::info!("Relayed file '{}' as '{}'", filename, modified);
        Ok(FileArtifact {
            download_url: format!("{}/files/{}", self.public_url, modified),
            filename: modified,
            content,
        })
    }
}
