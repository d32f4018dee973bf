use anyhow::Result;
use indoc::formatdoc;

use crate::model::ChatModel;

/// Reduces a multi-turn transcript to a one-line restatement of the user's
/// current intent, noting whether the turn continues the conversation or
/// signals its end.
///
/// # Errors
///
/// A remote failure propagates. Callers must fail the request instead of
/// running the retrieval pipeline with an un-clarified query.
pub async fn restate_intent(
    model: &dyn ChatModel,
    transcript: &str,
    max_tokens: u16,
) -> Result<String> {
    let prompt = formatdoc!(
        "Given the recent messages, what is the user's primary concern or intent in their last message? Note whether it continues the discussion or indicates the conversation is ending, and restate it in one line. Here is the conversation context:

        {transcript}"
    );

    Ok(model.complete(&prompt, max_tokens).await?.trim().to_owned())
}

/// Asks the model whether `latest` requests a structured summary.
///
/// The reply is matched exactly: lower-cased, trimmed, and compared to the
/// literal `yes`. Anything else counts as "no" — politeness phrasing and
/// partial matches included.
///
/// # Errors
///
/// Returns an error if the classification call fails.
pub async fn wants_summary(model: &dyn ChatModel, latest: &str, max_tokens: u16) -> Result<bool> {
    let prompt = formatdoc!(
        "Is the user asking for a structured summary of the conversation in the following message? Answer strictly \"yes\" or \"no\".

        {latest}"
    );

    let reply = model.complete(&prompt, max_tokens).await?;

    Ok(reply.trim().to_lowercase() == "yes")
}
