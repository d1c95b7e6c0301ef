//! # Apple Pay Session
//!
//! The runtime behind the Apple Pay factory. A session checks availability
//! in the background as soon as it is created, then drives one payment sheet
//! per `begin` call, reporting progress through its event emitter.

use crate::processor::{BoxedTokenProcessor, MerchantValidationRequest, TokenRequest};
use crate::sheet::{AuthorizationStatus, PaymentSheet, PaymentSheetProvider, SheetEvent};
use applepay_core::{
    build_payment_request, ApplePay, ApplePayConfig, ApplePayError, ApplePayEvent,
    ApplePayInstance, ApplePayResult, Callback, Emitter, EventEmitter, Listener, ListenerId,
    MerchantInfo, PaymentRequest, PaymentRequestUpdate, SessionEvent, Token,
    MIN_SHIPPING_CONTACT_FIELDS_VERSION,
};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Availability checks are running
    Initializing,
    /// A sheet can be presented
    Ready,
    /// A sheet is being prepared or is open
    InFlight,
    /// The last sheet produced a token
    Authorized,
    /// The last sheet was dismissed
    Cancelled,
    /// The last sheet ended with an error
    Failed,
    /// Initialization failed; the session will never become ready
    Unavailable(ApplePayError),
}

impl SessionState {
    /// True once initialization has succeeded
    pub fn is_ready(&self) -> bool {
        !matches!(
            self,
            SessionState::Initializing | SessionState::Unavailable(_)
        )
    }

    /// True when `begin` would present a sheet
    pub fn can_begin(&self) -> bool {
        matches!(
            self,
            SessionState::Ready
                | SessionState::Authorized
                | SessionState::Cancelled
                | SessionState::Failed
        )
    }
}

enum SheetOutcome {
    Authorized(Token),
    Cancelled,
}

struct Inner {
    state: SessionState,
    pending_ready: Vec<Callback>,
    merchant: Option<MerchantInfo>,
}

/// Apple Pay session driven by a platform sheet and a token processor
pub struct ApplePaySession {
    id: Uuid,
    created_at: DateTime<Utc>,
    config: ApplePayConfig,
    platform: Arc<dyn PaymentSheetProvider>,
    processor: BoxedTokenProcessor,
    events: EventEmitter<SessionEvent>,
    inner: Mutex<Inner>,
    readiness: watch::Sender<Option<ApplePayResult<()>>>,
    runtime: Option<Handle>,
    this: Weak<ApplePaySession>,
}

impl ApplePaySession {
    /// Create a session and start initializing it on the current tokio
    /// runtime. Without a runtime the session is unavailable from the start.
    pub fn new(
        config: ApplePayConfig,
        platform: Arc<dyn PaymentSheetProvider>,
        processor: BoxedTokenProcessor,
    ) -> Arc<Self> {
        let (readiness, _) = watch::channel(None);
        let session = Arc::new_cyclic(|this| Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            config,
            platform,
            processor,
            events: EventEmitter::new(),
            inner: Mutex::new(Inner {
                state: SessionState::Initializing,
                pending_ready: Vec::new(),
                merchant: None,
            }),
            readiness,
            runtime: Handle::try_current().ok(),
            this: this.clone(),
        });

        info!(
            session_id = %session.id,
            processor = session.processor.processor_name(),
            "Creating Apple Pay session"
        );

        match &session.runtime {
            Some(runtime) => {
                runtime.spawn(session.clone().initialize());
            }
            None => {
                error!(session_id = %session.id, "No tokio runtime; session cannot start");
                session.mark_unavailable(ApplePayError::InitError(
                    "no async runtime available".to_string(),
                ));
            }
        }

        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn config(&self) -> &ApplePayConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Merchant features fetched during initialization
    pub fn merchant_info(&self) -> Option<MerchantInfo> {
        self.lock().merchant.clone()
    }

    /// Wait for initialization to finish, returning its error if it failed
    pub async fn wait_ready(&self) -> ApplePayResult<()> {
        let mut rx = self.readiness.subscribe();
        let outcome = {
            let current = rx.wait_for(Option::is_some).await.map_err(|_| {
                ApplePayError::InitError("session closed during initialization".to_string())
            })?;
            current.clone()
        };
        outcome.unwrap_or(Ok(()))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[instrument(skip(self), fields(session_id = %self.id))]
    async fn initialize(self: Arc<Self>) {
        match self.check_availability().await {
            Ok(merchant) => self.mark_ready(merchant),
            Err(err) => self.mark_unavailable(err),
        }
    }

    async fn check_availability(&self) -> ApplePayResult<MerchantInfo> {
        self.config.validate()?;

        if !self.platform.is_supported() {
            return Err(ApplePayError::NotSupported);
        }

        if self.config.enforce_version
            && !self.config.required_shipping_contact_fields.is_empty()
            && !self
                .platform
                .supports_version(MIN_SHIPPING_CONTACT_FIELDS_VERSION)
        {
            warn!(
                "Platform lacks Apple Pay version {} for required shipping contact fields",
                MIN_SHIPPING_CONTACT_FIELDS_VERSION
            );
            return Err(ApplePayError::NotSupported);
        }

        if !self.platform.can_make_payments().await {
            return Err(ApplePayError::NotAvailable);
        }

        let merchant = self
            .processor
            .merchant_info()
            .await
            .map_err(|e| ApplePayError::InitError(format!("merchant info: {}", e)))?;

        // A pending price only has to exist here; its amount is read at begin.
        let preview_quote = self
            .config
            .pricing
            .as_ref()
            .map(|pricing| pricing.current().unwrap_or_default());
        build_payment_request(&self.config, preview_quote.as_ref(), Some(&merchant))?;

        Ok(merchant)
    }

    // The audience of the init outcome is fixed under the state lock;
    // anyone subscribing afterwards gets it replayed by `subscribe`.
    fn mark_ready(&self, merchant: MerchantInfo) {
        let (callbacks, audience) = {
            let mut inner = self.lock();
            inner.merchant = Some(merchant);
            inner.state = SessionState::Ready;
            (
                std::mem::take(&mut inner.pending_ready),
                self.events.take_audience(ApplePayEvent::Ready),
            )
        };
        self.readiness.send_replace(Some(Ok(())));

        info!(session_id = %self.id, "Apple Pay session ready");
        for cb in callbacks {
            cb();
        }
        let event = SessionEvent::Ready;
        for listener in &audience {
            listener(&event);
        }
    }

    fn mark_unavailable(&self, err: ApplePayError) {
        let audience = {
            let mut inner = self.lock();
            inner.state = SessionState::Unavailable(err.clone());
            inner.pending_ready.clear();
            self.events.take_audience(ApplePayEvent::Error)
        };
        self.readiness.send_replace(Some(Err(err.clone())));

        warn!(session_id = %self.id, code = err.code(), "Apple Pay unavailable: {}", err);
        let event = SessionEvent::Error(err);
        for listener in &audience {
            listener(&event);
        }
    }

    /// Register a listener, replaying the initialization outcome if it was
    /// settled before the listener arrived
    fn subscribe(
        &self,
        name: ApplePayEvent,
        listener: Listener<SessionEvent>,
        once: bool,
    ) -> ListenerId {
        let (id, replay) = {
            let inner = self.lock();
            let replay = match (name, &inner.state) {
                (ApplePayEvent::Error, SessionState::Unavailable(err)) => {
                    Some(SessionEvent::Error(err.clone()))
                }
                (ApplePayEvent::Ready, state) if state.is_ready() => Some(SessionEvent::Ready),
                _ => None,
            };
            let id = if once {
                self.events.once(name, listener.clone())
            } else {
                self.events.on(name, listener.clone())
            };
            if once && replay.is_some() {
                self.events.off(name, id);
            }
            (id, replay)
        };

        if let Some(event) = replay {
            debug!(session_id = %self.id, event = %name, "Replaying initialization outcome");
            listener(&event);
        }
        id
    }

    /// Payment request for the next sheet, using the latest price quote
    async fn payment_request(&self) -> ApplePayResult<PaymentRequest> {
        let quote = match &self.config.pricing {
            Some(pricing) => Some(pricing.quote().await?),
            None => None,
        };
        let merchant = self.merchant_info();
        build_payment_request(&self.config, quote.as_ref(), merchant.as_ref())
    }

    /// Rebuild `request` if live pricing has moved on since it was built
    fn refreshed_request(&self, request: &PaymentRequest) -> PaymentRequest {
        let Some(quote) = self.config.pricing.as_ref().and_then(|p| p.current()) else {
            return request.clone();
        };
        let merchant = self.merchant_info();
        match build_payment_request(&self.config, Some(&quote), merchant.as_ref()) {
            Ok(refreshed) => refreshed,
            Err(err) => {
                warn!(
                    code = err.code(),
                    "Keeping previous payment request, updated price quote is unusable: {}", err
                );
                request.clone()
            }
        }
    }

    fn display_name(&self) -> Option<String> {
        self.merchant_info()
            .and_then(|m| m.display_name)
            .or_else(|| self.config.label.clone())
    }

    #[instrument(skip(self, cb), fields(session_id = %self.id))]
    async fn run_payment(self: Arc<Self>, cb: Option<Callback>) {
        let (state, event) = match self.drive_sheet(cb).await {
            Ok(SheetOutcome::Authorized(token)) => {
                info!("Payment authorized, token {}", token.id);
                (SessionState::Authorized, SessionEvent::Token(token))
            }
            Ok(SheetOutcome::Cancelled) => {
                info!("Payment sheet cancelled");
                (SessionState::Cancelled, SessionEvent::Cancel)
            }
            Err(err) => {
                error!(code = err.code(), "Payment failed: {}", err);
                (SessionState::Failed, SessionEvent::Error(err))
            }
        };

        // Settle before emitting so listeners may begin again.
        self.lock().state = state;
        self.events.emit(event);
    }

    async fn drive_sheet(&self, cb: Option<Callback>) -> ApplePayResult<SheetOutcome> {
        let mut request = self.payment_request().await?;
        debug!(
            "Presenting sheet: total={:?}, {} line items",
            request.total_amount().map(|a| a.as_str()),
            request.line_items.len()
        );

        let mut sheet = self.platform.present(&request).await?;
        if let Some(cb) = cb {
            cb();
        }

        loop {
            let Some(event) = sheet.next_event().await else {
                debug!("Sheet closed without a result");
                return Ok(SheetOutcome::Cancelled);
            };

            match event {
                SheetEvent::ValidateMerchant { validation_url } => {
                    let validation = MerchantValidationRequest {
                        validation_url,
                        display_name: self.display_name(),
                    };
                    let merchant_session =
                        match self.processor.validate_merchant(&validation).await {
                            Ok(merchant_session) => merchant_session,
                            Err(e) => {
                                sheet.abort().await;
                                return Err(ApplePayError::MerchantValidation(e.to_string()));
                            }
                        };
                    let result = sheet.complete_merchant_validation(merchant_session).await;
                    abort_on_error(sheet.as_mut(), result).await?;
                }
                SheetEvent::ShippingContactSelected(contact) => {
                    self.events.emit(SessionEvent::ShippingContactSelected(contact));
                    request = self.refreshed_request(&request);
                    let update = sheet_update(&request)?;
                    let result = sheet.complete_shipping_contact_selection(update).await;
                    abort_on_error(sheet.as_mut(), result).await?;
                }
                SheetEvent::ShippingMethodSelected(method) => {
                    self.events.emit(SessionEvent::ShippingMethodSelected(method));
                    request = self.refreshed_request(&request);
                    let update = sheet_update(&request)?;
                    let result = sheet.complete_shipping_method_selection(update).await;
                    abort_on_error(sheet.as_mut(), result).await?;
                }
                SheetEvent::PaymentAuthorized(payment) => {
                    self.events.emit(SessionEvent::PaymentAuthorized(payment.clone()));

                    let token_request = TokenRequest::new(
                        &payment,
                        self.config.form.as_ref(),
                        self.config.braintree.as_ref(),
                    );
                    return match self.processor.tokenize(&token_request).await {
                        Ok(token) => {
                            if let Err(err) =
                                sheet.complete_payment(AuthorizationStatus::Success).await
                            {
                                error!(
                                    token_id = %token.id,
                                    "Token issued but the sheet rejected completion: {}", err
                                );
                                return Err(err);
                            }
                            Ok(SheetOutcome::Authorized(token))
                        }
                        Err(e) => {
                            if let Err(sheet_err) =
                                sheet.complete_payment(AuthorizationStatus::Failure).await
                            {
                                warn!("Could not report failure to sheet: {}", sheet_err);
                            }
                            Err(ApplePayError::PaymentFailure(e.to_string()))
                        }
                    };
                }
                SheetEvent::Cancelled => return Ok(SheetOutcome::Cancelled),
            }
        }
    }
}

fn sheet_update(request: &PaymentRequest) -> ApplePayResult<PaymentRequestUpdate> {
    PaymentRequestUpdate::from_request(request).ok_or_else(|| ApplePayError::missing("total"))
}

/// Pass a sheet completion result through, closing the sheet on failure
async fn abort_on_error(
    sheet: &mut dyn PaymentSheet,
    result: ApplePayResult<()>,
) -> ApplePayResult<()> {
    if let Err(err) = result {
        warn!("Sheet rejected completion: {}", err);
        sheet.abort().await;
        return Err(err);
    }
    Ok(())
}

impl Emitter<SessionEvent> for ApplePaySession {
    fn on(&self, name: ApplePayEvent, listener: Listener<SessionEvent>) -> ListenerId {
        self.subscribe(name, listener, false)
    }

    fn once(&self, name: ApplePayEvent, listener: Listener<SessionEvent>) -> ListenerId {
        self.subscribe(name, listener, true)
    }

    fn off(&self, name: ApplePayEvent, id: ListenerId) -> bool {
        self.events.off(name, id)
    }

    fn emit(&self, event: SessionEvent) -> usize {
        self.events.emit(event)
    }

    fn listener_count(&self, name: ApplePayEvent) -> usize {
        self.events.listener_count(name)
    }
}

impl ApplePayInstance for ApplePaySession {
    fn ready(&self, cb: Option<Callback>) {
        let Some(cb) = cb else {
            return;
        };
        let run_now = {
            let mut inner = self.lock();
            if inner.state.is_ready() {
                Some(cb)
            } else {
                if matches!(inner.state, SessionState::Initializing) {
                    inner.pending_ready.push(cb);
                }
                None
            }
        };
        if let Some(cb) = run_now {
            cb();
        }
    }

    fn begin(&self, cb: Option<Callback>) {
        let rejection = {
            let mut inner = self.lock();
            let rejection = match &inner.state {
                SessionState::Initializing => Some(ApplePayError::NotReady),
                SessionState::InFlight => Some(ApplePayError::InProgress),
                SessionState::Unavailable(err) => Some(err.clone()),
                SessionState::Ready
                | SessionState::Authorized
                | SessionState::Cancelled
                | SessionState::Failed => None,
            };
            if rejection.is_none() {
                inner.state = SessionState::InFlight;
            }
            rejection
        };

        if let Some(err) = rejection {
            warn!(session_id = %self.id, code = err.code(), "begin rejected: {}", err);
            self.events.emit(SessionEvent::Error(err));
            return;
        }

        match (self.this.upgrade(), self.runtime.as_ref()) {
            (Some(session), Some(runtime)) => {
                debug!(session_id = %self.id, "Starting payment sheet");
                runtime.spawn(session.run_payment(cb));
            }
            _ => {
                let err = ApplePayError::InitError("no async runtime available".to_string());
                self.lock().state = SessionState::Failed;
                self.events.emit(SessionEvent::Error(err));
            }
        }
    }
}

impl fmt::Debug for ApplePaySession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplePaySession")
            .field("id", &self.id)
            .field("state", &self.state())
            .field("processor", &self.processor.processor_name())
            .field("events", &self.events)
            .finish()
    }
}

/// Build an [`ApplePay`] factory backed by a platform and a processor.
///
/// Must be called from within a tokio runtime for sessions to initialize.
pub fn factory(
    platform: Arc<dyn PaymentSheetProvider>,
    processor: BoxedTokenProcessor,
) -> Box<ApplePay> {
    Box::new(move |config: ApplePayConfig| {
        ApplePaySession::new(config, platform.clone(), processor.clone())
            as Arc<dyn ApplePayInstance>
    })
}
