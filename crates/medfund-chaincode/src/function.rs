use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::InvokeError;

/// Every function exposed on the invocation surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    Intake,
    HospitalVerify,
    CivicVerify,
    Donate,
    GetRaised,
    IssueLoan,
    ConfirmLoanReceived,
    MarkFraud,
    Recharge,
    GetInfo,
    GetDonation,
    GetLoan,
    GetRecharge,
    Audit,
}

impl Function {
    pub const ALL: [Function; 14] = [
        Self::Intake,
        Self::HospitalVerify,
        Self::CivicVerify,
        Self::Donate,
        Self::GetRaised,
        Self::IssueLoan,
        Self::ConfirmLoanReceived,
        Self::MarkFraud,
        Self::Recharge,
        Self::GetInfo,
        Self::GetDonation,
        Self::GetLoan,
        Self::GetRecharge,
        Self::Audit,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Intake => "intake",
            Self::HospitalVerify => "hospitalVerify",
            Self::CivicVerify => "civicVerify",
            Self::Donate => "donate",
            Self::GetRaised => "getRaised",
            Self::IssueLoan => "issueLoan",
            Self::ConfirmLoanReceived => "confirmLoanReceived",
            Self::MarkFraud => "markFraud",
            Self::Recharge => "recharge",
            Self::GetInfo => "getInfo",
            Self::GetDonation => "getDonation",
            Self::GetLoan => "getLoan",
            Self::GetRecharge => "getRecharge",
            Self::Audit => "audit",
        }
    }

    /// Accepted argument counts.
    pub fn arity(&self) -> RangeInclusive<usize> {
        match self {
            Self::Intake => 9..=10,
            Self::HospitalVerify | Self::CivicVerify => 5..=5,
            Self::Donate | Self::IssueLoan => 5..=5,
            Self::ConfirmLoanReceived => 4..=4,
            Self::Recharge => 3..=3,
            Self::GetDonation | Self::GetLoan | Self::GetRecharge => 2..=2,
            Self::GetRaised | Self::MarkFraud | Self::GetInfo | Self::Audit => 1..=1,
        }
    }

    /// Whether the function can change ledger state.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Intake
                | Self::HospitalVerify
                | Self::CivicVerify
                | Self::Donate
                | Self::IssueLoan
                | Self::ConfirmLoanReceived
                | Self::MarkFraud
                | Self::Recharge
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = InvokeError;

    /// Canonical names plus the legacy `applicate`, `hVerify` and `loan`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applicate" => return Ok(Self::Intake),
            "hVerify" => return Ok(Self::HospitalVerify),
            "loan" => return Ok(Self::IssueLoan),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| InvokeError::UnknownFunction(s.to_string()))
    }
}
