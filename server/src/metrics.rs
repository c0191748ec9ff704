//! Business metrics for the helpdesk.
//!
//! # Exported Metrics
//!
//! - `helpdesk_tickets_created_total{channel}` - Tickets created, by entry point
//!   (`account`, `anonymous`, `public`)
//! - `helpdesk_access_denied_total{reason}` - Denied access checks, by reason code
//!
//! Ticket number conflicts and issuance timings are recorded by
//! `helpdesk_runtime::metrics`.

use helpdesk_core::access::DenyReason;
use metrics::describe_counter;

/// Tickets created, labelled by channel.
pub const TICKETS_CREATED_TOTAL: &str = "helpdesk_tickets_created_total";
/// Denied access checks, labelled by reason.
pub const ACCESS_DENIED_TOTAL: &str = "helpdesk_access_denied_total";

/// Where a ticket came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TicketChannel {
    /// Created by an identified caller
    Account,
    /// Created without a caller; the ticket is unowned
    Anonymous,
    /// Created through the public form, which finds or registers an account
    Public,
}

impl TicketChannel {
    const fn label(self) -> &'static str {
        match self {
            Self::Account => "account",
            Self::Anonymous => "anonymous",
            Self::Public => "public",
        }
    }
}

/// Register business metric descriptions.
///
/// This should be called once at application startup, before any metrics are recorded.
pub fn register_business_metrics() {
    describe_counter!(
        TICKETS_CREATED_TOTAL,
        "Total number of tickets created by channel (account, anonymous, public)"
    );
    describe_counter!(
        ACCESS_DENIED_TOTAL,
        "Total number of denied access checks by reason"
    );

    tracing::info!("Business metrics registered");
}

/// Count a created ticket.
pub fn record_ticket_created(channel: TicketChannel) {
    metrics::counter!(TICKETS_CREATED_TOTAL, "channel" => channel.label()).increment(1);
}

/// Count a denied access check.
pub fn record_access_denied(reason: DenyReason) {
    metrics::counter!(ACCESS_DENIED_TOTAL, "reason" => reason.code()).increment(1);
}
