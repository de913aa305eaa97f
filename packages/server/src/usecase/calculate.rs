//! UseCase: 数式の計算
//!
//! 結果・エラーともにサーバー名義のメッセージとして送信者に返す。

use crate::domain::{ChatMessage, evaluate};

/// 計算リクエストのユースケース
#[derive(Debug, Default, Clone, Copy)]
pub struct CalculateUseCase;

impl CalculateUseCase {
    pub fn new() -> Self {
        Self
    }

    /// 数式を評価し、送信者への返信を組み立てる
    pub fn execute(&self, calculation: &str) -> ChatMessage {
        match evaluate(calculation) {
            Ok(value) => {
                tracing::debug!("Evaluated '{}' = {}", calculation, value);
                ChatMessage::system(format!("Result: {} = {:.2}", calculation, value))
            }
            Err(e) => {
                tracing::warn!("Failed to evaluate '{}': {}", calculation, e);
                ChatMessage::system(format!("Invalid calculation: {}", e))
            }
        }
    }

    /// 形式が不正な計算リクエストへの返信
    pub fn invalid_format(&self) -> ChatMessage {
        ChatMessage::system("Invalid calculation request format.")
    }
}
