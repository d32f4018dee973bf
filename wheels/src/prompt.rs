use indoc::formatdoc;

/// Assembles the retrieval prompt: preamble, user query, retrieved context,
/// and the answer cue that primes the model to continue.
///
/// Pure concatenation — nothing is truncated here, so callers own keeping
/// the context inside the model's input limit.
#[must_use]
pub fn build_prompt(query: &str, context: &str) -> String {
    formatdoc!(
        "Answer the question posed in the user query section using the provided context.
        USER QUERY: {query}
        CONTEXT: {context}
        Final Answer: "
    )
}

/// Assembles the meeting-summary prompt. No query section: the accumulated
/// conversation is the whole input.
#[must_use]
pub fn build_meeting_prompt(context: &str) -> String {
    formatdoc!(
        "Provide a concise summary based strictly on the meeting context given below. Do not add information outside of what is mentioned in the context, and keep the summary brief:
        CONTEXT: {context}
        Final Answer: "
    )
}

#[cfg(test)]
mod tests {
    use super::{build_meeting_prompt, build_prompt};

    #[test]
    fn sections_appear_in_order() {
        let prompt = build_prompt("Who founded Food on Wheels?", "Founded in 2019.");

        let query = prompt.find("USER QUERY:").unwrap();
        let context = prompt.find("CONTEXT:").unwrap();
        let answer = prompt.find("Final Answer:").unwrap();

        assert!(query < context && context < answer);
        assert!(prompt.contains("Who founded Food on Wheels?"));
        assert!(prompt.contains("Founded in 2019."));
    }

    #[test]
    fn meeting_prompt_has_no_query_section() {
        let prompt = build_meeting_prompt("alice: shipped the release");

        assert!(!prompt.contains("USER QUERY:"));
        let context = prompt.find("CONTEXT:").unwrap();
        let answer = prompt.find("Final Answer:").unwrap();
        assert!(context < answer);
    }
}
