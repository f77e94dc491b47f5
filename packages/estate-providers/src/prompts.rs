/// Fences free text so the model treats it as data rather than instructions.
pub fn build_user_prompt(text: &str) -> String {
	format!("<<<\n{text}\n>>>")
}

pub fn note_analysis_system_prompt() -> &'static str {
	r#"You extract structured facts about a commercial property from a free-text note. Reply with one JSON object and nothing else.

Schema:
{
  "nearSubway": boolean,
  "needsRenovation": boolean,
  "estimatedCapacityPeople": number,
  "recommendedUse": "office" | "warehouse" | "retail"
}

When the note does not mention a field use: nearSubway=false, needsRenovation=false, estimatedCapacityPeople=null, recommendedUse=null."#
}

pub fn filter_extraction_system_prompt() -> &'static str {
	r#"You turn a property search request into search criteria. Reply with one JSON object and nothing else.

Schema:
{
  "city": string or null,
  "neighborhood": string or null,
  "propertyType": "office" | "warehouse" | "retail" | null,
  "minPrice": number or null,
  "maxPrice": number or null,
  "minArea": number or null,
  "maxArea": number or null,
  "nearSubway": boolean or null,
  "needsRenovation": boolean or null,
  "recommendedUse": "office" | "warehouse" | "retail" | null,
  "estimatedCapacityPeople": number or null
}

Rules:
- Use null for every field the request neither states nor implies.
- Write amounts as plain numbers: "500k" is 500000 and "1 million" is 1000000.
- "around X sqm" or "about X sqm" means minArea = floor(X * 0.9) and maxArea = ceil(X * 1.1).
- "at least X" or "minimum X" sets only the min field.
- "up to X" or "maximum X" sets only the max field.
- nearSubway is true when the request asks to be near a subway, metro or similar transit.
- needsRenovation is true when the request wants a property to renovate and false when it wants one that is ready to use."#
}
