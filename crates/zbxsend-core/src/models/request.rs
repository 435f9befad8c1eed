//! 전송 요청 페이로드 모델.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::metric::Metric;

/// trapper 전송 요청 식별자
pub const SENDER_DATA_REQUEST: &str = "sender data";

/// `{"request":"sender data","data":[...]}` 본문
///
/// 인코딩 시에는 청크 슬라이스를 빌려 쓰고, 디코딩 시에는 소유 데이터를 만든다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderRequest<'a> {
    /// 요청 종류 (항상 "sender data")
    pub request: Cow<'a, str>,
    /// 청크 내 메트릭 (입력 순서 유지)
    pub data: Cow<'a, [Metric]>,
}

impl<'a> SenderRequest<'a> {
    /// 메트릭 슬라이스로 요청 생성
    pub fn new(metrics: &'a [Metric]) -> Self {
        Self {
            request: Cow::Borrowed(SENDER_DATA_REQUEST),
            data: Cow::Borrowed(metrics),
        }
    }

    /// 소유 데이터로 변환
    pub fn into_owned(self) -> SenderRequest<'static> {
        SenderRequest {
            request: Cow::Owned(self.request.into_owned()),
            data: Cow::Owned(self.data.into_owned()),
        }
    }
}
