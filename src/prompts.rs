//! Instruction text sent to the hosted model. Both presentations use these.

pub const DIAGNOSIS_INSTRUCTION: &str = "\
You are an expert in agriculture. Your task is to analyze an image of a crop and provide the following information in a JSON format:
- \"crop_name\": The name of the crop.
- \"disease_pest\": The name of the disease or pest affecting the crop.
- \"treatment\": A detailed treatment plan, including both organic and chemical solutions.

Your response must be a valid JSON object, with no extra text before or after the JSON.";

/// `language` is a human-readable name such as "Hindi", not a code.
pub fn translation_prompt(language: &str, text: &str) -> String {
    format!("Translate the following text to {}:\n\n{}", language, text)
}
