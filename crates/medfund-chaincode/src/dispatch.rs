use tracing::{debug, info, warn};

use medfund_ledger::Engine;
use medfund_store::LedgerStore;

use crate::args::Args;
use crate::error::InvokeResult;
use crate::function::Function;
use crate::response::{self, Response, OK};

/// Entry point for the host runtime: one call per invocation.
pub struct Chaincode<S: LedgerStore> {
    engine: Engine<S>,
}

impl<S: LedgerStore> Chaincode<S> {
    pub fn new(engine: Engine<S>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Engine<S> {
        &self.engine
    }

    /// Execute `function` with its ordered arguments and wrap the outcome.
    pub fn invoke(&self, function: &str, args: &[String]) -> Response {
        let result = self.try_invoke(function, args);
        match &result {
            Ok(payload) => debug!(function, payload = %payload, "invocation succeeded"),
            Err(err) => warn!(function, kind = %err.kind(), error = %err, "invocation failed"),
        }
        result.into()
    }

    /// Like [`Chaincode::invoke`] but returns the typed error.
    pub fn try_invoke(&self, function: &str, args: &[String]) -> InvokeResult<String> {
        let function: Function = function.parse()?;
        let args = Args::new(function, args)?;
        info!(function = %function, argc = args.len(), "invoke");
        self.dispatch(&args)
    }

    fn dispatch(&self, args: &Args<'_>) -> InvokeResult<String> {
        let engine = &self.engine;
        match args.function() {
            Function::Intake => {
                engine.intake(args.intake()?)?;
                Ok(OK.into())
            }
            Function::HospitalVerify => {
                engine.hospital_verify(args.review()?)?;
                Ok(OK.into())
            }
            Function::CivicVerify => {
                engine.civic_verify(args.review()?)?;
                Ok(OK.into())
            }
            Function::Donate => response::counter(engine.donate(args.donation()?)?),
            Function::GetRaised => Ok(engine.get_raised(&args.application_id()?)?.to_string()),
            Function::IssueLoan => response::counter(engine.issue_loan(args.loan()?)?),
            Function::ConfirmLoanReceived => {
                engine.confirm_loan_received(args.loan_receipt()?)?;
                Ok(OK.into())
            }
            Function::MarkFraud => {
                engine.mark_fraud(&args.application_id()?)?;
                Ok(OK.into())
            }
            Function::Recharge => response::counter(engine.recharge(args.recharge()?)?),
            Function::GetInfo => response::json(&engine.get_info(&args.application_id()?)?),
            Function::GetDonation => {
                response::json(&engine.get_donation(&args.application_id()?, args.seq(1)?)?)
            }
            Function::GetLoan => {
                response::json(&engine.get_loan(&args.application_id()?, args.seq(1)?)?)
            }
            Function::GetRecharge => {
                response::json(&engine.get_recharge(&args.application_id()?, args.seq(1)?)?)
            }
            Function::Audit => response::json(&engine.audit(&args.application_id()?)?),
        }
    }
}
