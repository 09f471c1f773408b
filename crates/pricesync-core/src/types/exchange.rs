//! 거래소 코드 정의.
//!
//! 문자열 값은 TradingView가 기대하는 코드와 정확히 일치합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 수집 대상 거래소.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
    /// 보르사 이스탄불
    #[serde(rename = "BIST")]
    Bist,
    /// 미국 나스닥
    #[serde(rename = "NASDAQ")]
    Nasdaq,
    /// 뉴욕증권거래소
    #[serde(rename = "NYSE")]
    Nyse,
    /// 아메리칸 증권거래소
    #[serde(rename = "AMEX")]
    Amex,
    /// 런던증권거래소
    #[serde(rename = "LSE")]
    Lse,
    /// 독일 XETRA
    #[serde(rename = "XETRA")]
    Xetra,
    /// 암호화폐 (선택)
    #[serde(rename = "BINANCE")]
    Binance,
    /// 환율 (선택)
    #[serde(rename = "FX_IDC")]
    FxIdc,
}

impl Exchange {
    /// 지원하는 모든 거래소.
    pub const ALL: [Exchange; 8] = [
        Exchange::Bist,
        Exchange::Nasdaq,
        Exchange::Nyse,
        Exchange::Amex,
        Exchange::Lse,
        Exchange::Xetra,
        Exchange::Binance,
        Exchange::FxIdc,
    ];

    /// 업스트림 거래소 코드.
    pub fn code(&self) -> &'static str {
        match self {
            Exchange::Bist => "BIST",
            Exchange::Nasdaq => "NASDAQ",
            Exchange::Nyse => "NYSE",
            Exchange::Amex => "AMEX",
            Exchange::Lse => "LSE",
            Exchange::Xetra => "XETRA",
            Exchange::Binance => "BINANCE",
            Exchange::FxIdc => "FX_IDC",
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Exchange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        if code == "FOREX" {
            return Ok(Exchange::FxIdc);
        }
        Exchange::ALL
            .into_iter()
            .find(|e| e.code() == code)
            .ok_or_else(|| format!("Unknown exchange: {}", s))
    }
}
