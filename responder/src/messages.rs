//! Fixed user-facing texts. Callers match on these to detect soft failures.

pub const EMPTY_QUERY: &str =
    "Please provide a query to learn more about NicorAI’s services, case studies, or company details!";

pub const KNOWLEDGE_BASE_UNAVAILABLE: &str =
    "Sorry, I couldn’t connect to the Knowledge Base. Please try again!";

pub const NO_RESULTS: &str =
    "Hmm, I don’t know that yet! 😅 But if you have questions about NicorAI, I’m all ears. Ask away!";

pub const GENERATION_FAILED: &str = "Sorry, something went wrong. Please try again!";

pub const INVALID_FORMAT: &str = "Invalid response format. Please try again!";
