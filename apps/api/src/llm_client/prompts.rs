// Shared prompt fragments. Feature prompts live beside the feature that uses them.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to extraction prompts so missing data stays empty rather than invented.
pub const NO_INVENTION_INSTRUCTION: &str = "\
    If any field is missing from the source text, return an empty string or empty array. \
    Do NOT infer, interpolate, or invent details that are not present.";
