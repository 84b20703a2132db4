//! Final consistency pass over an envelope before it leaves the generator.

use tracing::{error, warn};

use crate::envelope::{Content, EnvelopeMetadata, ResponseEnvelope, ResponseType};
use crate::messages::INVALID_FORMAT;

/// Generic error envelope used when an envelope is structurally broken.
pub fn invalid_format_envelope() -> ResponseEnvelope {
    ResponseEnvelope::text(INVALID_FORMAT, EnvelopeMetadata::none())
}

/// Repairs or replaces `env`:
/// - an empty id, or a type disagreeing with the content, yields the generic error envelope;
/// - a view whose inner `viewType` differs from the outer one takes the outer value.
pub fn validate(mut env: ResponseEnvelope) -> ResponseEnvelope {
    let consistent = matches!(
        (&env.response_type, &env.content),
        (ResponseType::Text, Content::Text { .. }) | (ResponseType::View, Content::View { .. })
    );
    if env.response_id.trim().is_empty() || !consistent {
        error!(
            response_type = ?env.response_type,
            "invalid response envelope; replacing with error envelope"
        );
        return invalid_format_envelope();
    }

    if let Content::View {
        view_type,
        view_spec,
    } = &mut env.content
    {
        if view_spec.view_type != *view_type {
            warn!(
                outer = ?view_type,
                inner = ?view_spec.view_type,
                "view type mismatch; keeping the outer value"
            );
            view_spec.view_type = *view_type;
        }
    }
    env
}
