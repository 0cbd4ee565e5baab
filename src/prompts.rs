// prompts.rs

/// System persona sent with every narration request.
pub const STARGAZER_PERSONA: &str = "You are an astrologer and have deep knowledge of the stars \
and the universe. Your explanation should be short — around 80-100 words — and sound like it \
could be told by a wise stargazer who sees both science and soul in the stars.";

/// User prompt for one picture. Only the title is embedded.
pub fn image_explanation_prompt(title: &str) -> String {
    format!(
        "The following image is from NASA's Astronomy Picture of the Day.
Title: {}
Create an explanation of the image in a way that is easy to understand and engaging.",
        title
    )
}
