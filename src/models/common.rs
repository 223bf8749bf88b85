use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// 读接口降级返回默认值时为 true
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            degraded: false,
            message: None,
            error: None,
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            data: Some(data),
            degraded: false,
            message: Some(message),
            error: None,
        }
    }

    pub fn from_outcome(outcome: ReadOutcome<T>) -> Self {
        match outcome.status {
            ReadStatus::Fresh => Self::success(outcome.data),
            ReadStatus::Fallback { reason } => Self {
                success: true,
                data: Some(outcome.data),
                degraded: true,
                message: None,
                error: Some(ApiError {
                    code: STORAGE_UNAVAILABLE_CODE.to_string(),
                    message: reason,
                    field: None,
                }),
            },
        }
    }
}

pub const STORAGE_UNAVAILABLE_CODE: &str = "STORAGE_UNAVAILABLE";
pub const STORAGE_UNAVAILABLE_MESSAGE: &str = "Data is temporarily unavailable";

/// 读接口结果是否来自存储层，还是存储失败后的默认值
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReadStatus {
    Fresh,
    Fallback { reason: String },
}

/// 列表/汇总类读接口的返回值
///
/// 存储层失败时仍返回约定的空值/零值以保证页面可渲染，但通过 `status`
/// 明确告知调用方这是降级结果，而不是“确实没有数据”。
#[derive(Debug, Clone)]
pub struct ReadOutcome<T> {
    pub data: T,
    pub status: ReadStatus,
}

impl<T> ReadOutcome<T> {
    pub fn fresh(data: T) -> Self {
        Self {
            data,
            status: ReadStatus::Fresh,
        }
    }

    pub fn fallback(data: T, reason: impl Into<String>) -> Self {
        Self {
            data,
            status: ReadStatus::Fallback {
                reason: reason.into(),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.status, ReadStatus::Fallback { .. })
    }

    pub fn into_data(self) -> T {
        self.data
    }

    /// 存储错误降级为 `fallback()` 的值；校验、业务等其它错误照常返回
    pub fn recover_with(
        procedure: &str,
        result: AppResult<T>,
        fallback: impl FnOnce() -> T,
    ) -> AppResult<Self> {
        match result {
            Ok(data) => Ok(Self::fresh(data)),
            Err(AppError::DatabaseError(err)) => {
                log::error!("{procedure} failed, serving default value: {err}");
                Ok(Self::fallback(fallback(), STORAGE_UNAVAILABLE_MESSAGE))
            }
            Err(other) => Err(other),
        }
    }
}

impl<T: Default> ReadOutcome<T> {
    pub fn recover(procedure: &str, result: AppResult<T>) -> AppResult<Self> {
        Self::recover_with(procedure, result, T::default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn test_recover_storage_error() {
        let result: AppResult<Vec<i32>> = Err(AppError::DatabaseError(DbErr::Custom(
            "connection reset".into(),
        )));
        let outcome = ReadOutcome::recover("test.list", result).unwrap();
        assert!(outcome.is_fallback());
        assert!(outcome.data.is_empty());
    }

    #[test]
    fn test_recover_keeps_other_errors() {
        let result: AppResult<Vec<i32>> = Err(AppError::invalid("page", "must be positive"));
        assert!(ReadOutcome::recover("test.list", result).is_err());
    }

    #[test]
    fn test_fallback_response_is_marked_degraded() {
        let response = ApiResponse::from_outcome(ReadOutcome::fallback(
            Vec::<i32>::new(),
            STORAGE_UNAVAILABLE_MESSAGE,
        ));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["degraded"], true);
        assert_eq!(json["error"]["code"], STORAGE_UNAVAILABLE_CODE);

        let fresh = serde_json::to_value(ApiResponse::success(vec![1])).unwrap();
        assert!(fresh.get("degraded").is_none());
    }
}
