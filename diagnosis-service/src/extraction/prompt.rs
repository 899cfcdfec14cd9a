pub const EXTRACTOR_PREAMBLE: &str =
    "You are a medical symptom extractor. You only ever answer with a list of symptom names.";

/// Prompt asking the model to map `message` onto names from `vocabulary`.
pub fn build_prompt(message: &str, vocabulary: &[String]) -> String {
    let symptoms_list = vocabulary.join(", ");
    format!(
        r#"You are a medical symptom extractor. Your task is to extract ONLY symptoms that are in the provided list.

Available symptoms (use EXACTLY these terms):
{symptoms_list}

Rules:
1. ONLY return symptoms that are in the list above
2. Return the symptoms as a list, for example ['a', 'b']
3. Use the EXACT symptom names from the list
4. If no symptoms match, return an empty list: []
5. Do not add any explanations or additional text
6. If a symptom is mentioned in different words, match it to the closest name in the list

Example input: "I have a fever and my head hurts and im puking"
Example output: ['high_fever', 'headache', 'vomiting']

Example input: "im having a headache have body aches and am feeling very cold"
Example output: ['headache', 'muscle_pain', 'chills']

Message to analyze: {message}"#
    )
}
