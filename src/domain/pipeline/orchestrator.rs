//! Sequencing of one swap run

use rust_decimal::Decimal;
use tracing::{error, info, info_span, Instrument};

use super::state::{PipelineReport, PipelineState, StageFailure};
use crate::domain::amount::AmountConverter;
use crate::domain::chain::{ChainClient, TxSigner};
use crate::domain::execution::{ApprovalStep, SwapExecutor};
use crate::domain::routing::RouteClient;
use crate::shared::errors::SwapError;
use crate::shared::types::{
    ApprovalRecord, BaseUnitAmount, GasParameters, Route, SwapOptions, Token, TradeDirection,
};
use crate::shared::utils::generate_id;

/// Inputs of one run
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub token_in: Token,
    pub token_out: Token,
    /// Denominated in `token_in` for exact-input trades, `token_out` otherwise
    pub amount: Decimal,
    pub direction: TradeDirection,
    pub options: SwapOptions,
    pub gas: GasParameters,
}

impl SwapRequest {
    /// Token the amount is denominated in
    pub fn amount_token(&self) -> &Token {
        match self.direction {
            TradeDirection::ExactInput => &self.token_in,
            TradeDirection::ExactOutput => &self.token_out,
        }
    }

    /// The other side of the trade
    pub fn quote_token(&self) -> &Token {
        match self.direction {
            TradeDirection::ExactInput => &self.token_out,
            TradeDirection::ExactOutput => &self.token_in,
        }
    }
}

/// What a quote-only run found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePreview {
    pub base_amount: BaseUnitAmount,
    pub quoted_estimate: BaseUnitAmount,
    pub value_to_send: alloy::primitives::U256,
    pub call_data_len: usize,
}

/// Drives `Converting -> Quoting -> Approving -> Swapping`. Any failure ends
/// the run in `Failed`; there is no resume, a new run starts from scratch.
pub struct PipelineOrchestrator {
    converter: AmountConverter,
    route_client: RouteClient,
    approval: ApprovalStep,
    executor: SwapExecutor,
}

impl PipelineOrchestrator {
    pub fn new(
        converter: AmountConverter,
        route_client: RouteClient,
        approval: ApprovalStep,
        executor: SwapExecutor,
    ) -> Self {
        Self {
            converter,
            route_client,
            approval,
            executor,
        }
    }

    /// Execute a full run. The chain client and signer are only borrowed for
    /// the duration of the call.
    pub async fn run(
        &self,
        chain: &dyn ChainClient,
        signer: &dyn TxSigner,
        request: SwapRequest,
    ) -> PipelineReport {
        let mut report = PipelineReport::new(generate_id());
        let span = info_span!("pipeline", run_id = %report.run_id);

        async {
            info!(
                "Starting swap run: {} {} ({}) {} -> {}",
                request.amount,
                request.amount_token().symbol,
                request.direction.as_str(),
                request.token_in.symbol,
                request.token_out.symbol
            );

            match self.drive(chain, signer, &request, &mut report).await {
                Ok(()) => {
                    report.enter(PipelineState::Succeeded);
                    info!("✅ Swap run succeeded");
                }
                Err(e) => {
                    error!("❌ Swap run failed in {}: {}", report.current_state(), e);
                    report.fail(e);
                }
            }
        }
        .instrument(span)
        .await;

        report
    }

    /// Convert and quote only. The route is dropped, nothing is submitted.
    pub async fn preview(&self, request: &SwapRequest) -> Result<RoutePreview, StageFailure> {
        let base_amount = self
            .convert(request)
            .map_err(|error| StageFailure {
                stage: PipelineState::Converting,
                error,
            })?;
        let route = self
            .quote(request, base_amount)
            .await
            .map_err(|error| StageFailure {
                stage: PipelineState::Quoting,
                error,
            })?;

        Ok(RoutePreview {
            base_amount,
            quoted_estimate: route.quoted_estimate,
            value_to_send: route.value_to_send,
            call_data_len: route.call_data.len(),
        })
    }

    async fn drive(
        &self,
        chain: &dyn ChainClient,
        signer: &dyn TxSigner,
        request: &SwapRequest,
        report: &mut PipelineReport,
    ) -> Result<(), SwapError> {
        report.enter(PipelineState::Converting);
        let base_amount = self.convert(request)?;
        report.base_amount = Some(base_amount);

        report.enter(PipelineState::Quoting);
        let route = self.quote(request, base_amount).await?;
        report.quoted_estimate = Some(route.quoted_estimate);

        report.enter(PipelineState::Approving);
        let spender = self.executor.router();
        let allowance = self.approval_amount(request, base_amount, &route)?;
        let outcome = self
            .approval
            .ensure_approval(chain, signer, &request.token_in, spender, allowance, &request.gas)
            .await?;
        report.approval = Some(ApprovalRecord {
            token: request.token_in.address,
            spender,
            amount: allowance,
            outcome,
        });

        report.enter(PipelineState::Swapping);
        let outcome = self
            .executor
            .submit_swap(chain, signer, route, signer.address(), &request.gas)
            .await?;
        let reverted = (!outcome.confirmed).then(|| SwapExecutor::revert_error(&outcome));
        report.swap = Some(outcome);
        if let Some(err) = reverted {
            return Err(err);
        }

        Ok(())
    }

    fn convert(&self, request: &SwapRequest) -> Result<BaseUnitAmount, SwapError> {
        let base = self
            .converter
            .to_base_units(request.amount, request.amount_token().decimals)?;
        info!(
            "Converted {} {} to {} base units",
            request.amount,
            request.amount_token().symbol,
            base
        );
        Ok(base)
    }

    async fn quote(&self, request: &SwapRequest, base_amount: BaseUnitAmount) -> Result<Route, SwapError> {
        self.route_client
            .quote_route(
                base_amount,
                request.amount_token(),
                request.quote_token(),
                request.direction,
                &request.options,
            )
            .await
    }

    /// Exact input approves what is sold; exact output approves the quoted
    /// input plus slippage, rounded up.
    fn approval_amount(
        &self,
        request: &SwapRequest,
        base_amount: BaseUnitAmount,
        route: &Route,
    ) -> Result<BaseUnitAmount, SwapError> {
        match request.direction {
            TradeDirection::ExactInput => Ok(base_amount),
            TradeDirection::ExactOutput => request
                .options
                .slippage
                .max_amount(route.quoted_estimate)
                .ok_or_else(|| {
                    SwapError::InvalidAmount(format!(
                        "quoted input {} plus slippage exceeds uint256",
                        route.quoted_estimate
                    ))
                }),
        }
    }
}
