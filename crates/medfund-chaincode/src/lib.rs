//! Host adapter for the medfund ledger.
//!
//! The host runtime calls [`Chaincode::invoke`] with a function name and an
//! ordered list of string arguments. The adapter decodes them into typed
//! requests, runs them on the [`medfund_ledger::Engine`], and wraps the
//! result in a [`Response`]:
//!
//! | Function              | Arguments                                                   | Payload          |
//! |-----------------------|-------------------------------------------------------------|------------------|
//! | `intake`              | id, name, nationalId, hospital, department, civicOffice, card, descHash, amount [, attachments] | `OK` |
//! | `hospitalVerify`      | id, operator, decision, approvedAmount, attachments         | `OK`             |
//! | `civicVerify`         | id, operator, decision, approvedAmount, attachments         | `OK`             |
//! | `donate`              | id, donor, amount, settlementRef, platformId                | `{"counter":n}`  |
//! | `getRaised`           | id                                                          | decimal text     |
//! | `issueLoan`           | id, amount, loanNumber, firstRepayment, totalPeriods        | `{"counter":n}`  |
//! | `confirmLoanReceived` | id, loanNumber, loanSeq, settlementRef                      | `OK`             |
//! | `markFraud`           | id                                                          | `OK`             |
//! | `recharge`            | id, settlementRef, amount                                   | `{"counter":n}`  |
//! | `getInfo`             | id                                                          | application JSON |
//! | `getDonation` / `getLoan` / `getRecharge` | id, seq                                 | record JSON      |
//! | `audit`               | id                                                          | report JSON      |
//!
//! `applicate`, `hVerify` and `loan` are accepted as aliases.

pub mod args;
pub mod dispatch;
pub mod error;
pub mod function;
pub mod response;

pub use dispatch::Chaincode;
pub use error::{InvokeError, InvokeResult};
pub use function::Function;
pub use response::{Response, OK};
