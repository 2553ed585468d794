// src/classify/prompts.rs
//! Fixed instruction templates sent to the text-generation service.

use super::Classification;

const ARTICLE_TEXT_SLOT: &str = "{provided_text}";
const ANALYSES_SLOT: &str = "{individual_analyses_summary}";

pub const INDIVIDUAL_TEMPLATE: &str = r#"Carefully analyze the following news article text for information directly indicating potential **upselling opportunities** specifically for an **employee benefits company in India**. Focus only on details that would suggest a company is growing, investing in employees, or has increased financial capacity to enhance its employee benefits programs.

**Text:**
{provided_text}

Based on your analysis and using the provided categories below, determine the upselling opportunity level and the specific reason(s).

1.  **Opportunity Level (First Line):** State the opportunity level as one of the following:
    * "High Opportunity"
    * "Medium Opportunity"
    * "Low Opportunity"
    * "No Upsell Opportunity Indicated" (If no relevant information is found regarding upselling for an employee benefits company)

2.  **Reason(s) for Opportunity (Second Line):** If an opportunity is indicated, explain the major reason(s) concisely, referencing the relevant category (e.g., "Reason: [Category Name] - Brief explanation."). If there are multiple relevant reasons, list them clearly.

3.  **2-Line Summary of Analysis (Third and Fourth Lines):** Provide a brief, overall summary of the article's relevance to upselling for an employee benefits company, condensing the key findings into exactly two lines. If no upselling opportunity is indicated, summarize why the article is not relevant.

**Categories for Reasons:**
I.  **Financial Growth & Stability:** (Record revenue, profit growth, funding rounds, IPOs, strong financial performance, increased valuation, successful cost optimization leading to increased budgets)
II. **Workforce Expansion & Hiring:** (Mass hiring, significant headcount growth, talent acquisition drives, campus recruitment, leadership hiring, expansion into new markets requiring more employees)
III. **Employee-Centric Initiatives:** (New employee wellness programs, enhanced mental health support, focus on employee experience, DEI initiatives, improved workplace culture, employee recognition programs)
IV. **Strategic Investments & Expansion:** (Business expansion, new product launches, digital transformation, acquisition of new companies, investments in HR tech, major strategic partnerships)
V.  **Market Leadership & Employer Branding:** (Awards for best workplace, "Great Place to Work" recognition, strong employer branding, high employee satisfaction/retention rates)
VI. **Benefits Strategy Evolution:** (Overhaul of benefits, digitization of HR/benefits, adoption of new benefits platforms, focus on flexible/hybrid work benefits, efforts to optimize benefits structure)
VII. **Compliance & Regulatory Readiness:** (Proactive measures for new labor laws, tax benefits for employees, social security code adherence, ensuring comprehensive benefits compliance)

**Example Output Format (for High/Medium/Low Opportunity):**
High Opportunity
Reason: Financial Growth & Stability - Company announced record profits and significant investment plans, suggesting increased budget for employee benefits.
Summary: The company's robust financial performance indicates a strong capacity and potential willingness to invest more in comprehensive employee benefits. This presents a prime opportunity for enhanced offerings.

**Example Output Format (for No Opportunity):**
No Upsell Opportunity Indicated
Summary: The article discusses general industry trends not specific to the company's growth or employee-related initiatives. It provides no indication of changes relevant to enhanced employee benefits or potential upselling.
"#;

pub const COMBINED_TEMPLATE: &str = r#"Given the individual analyses of news articles related to a company and potential client upselling opportunities, provide an overall summary (at most 4 lines).

**Individual Article Analyses:**
{individual_analyses_summary}

In the first line, state the overall opportunity level for upselling for the company (e.g., "Overall High Opportunity," "Overall Medium Opportunity," "Overall Low Opportunity," "Overall No Upsell Opportunity Indicated"). In the subsequent lines, summarize the major reasons for this overall opportunity, drawing from the categories mentioned in the individual analyses. Be concise and focus on the most impactful reasons across all articles. If no relevant information is found across all articles, state "Overall No Upsell Opportunity Indicated."
"#;

pub fn individual_prompt(article_text: &str) -> String {
    INDIVIDUAL_TEMPLATE.replacen(ARTICLE_TEXT_SLOT, article_text, 1)
}

/// `Article {i} Analysis:\n{text}` blocks, 1-based, blank-line separated.
pub fn analyses_block(results: &[Classification]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, c)| format!("Article {} Analysis:\n{}", i + 1, c.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn combined_prompt(analyses_block: &str) -> String {
    COMBINED_TEMPLATE.replacen(ANALYSES_SLOT, analyses_block, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Origin;

    #[test]
    fn individual_prompt_embeds_text_once() {
        let p = individual_prompt("Acme raises Series B");
        assert!(p.contains("**Text:**\nAcme raises Series B\n"));
        assert!(!p.contains(ARTICLE_TEXT_SLOT));
    }

    #[test]
    fn article_text_with_braces_is_taken_literally() {
        let p = individual_prompt("{individual_analyses_summary} {provided_text}");
        assert!(p.contains("**Text:**\n{individual_analyses_summary} {provided_text}\n"));
    }

    #[test]
    fn analyses_block_is_one_based() {
        let rs = vec![
            Classification::new("High Opportunity", Origin::Model),
            Classification::new("Low Opportunity", Origin::Model),
        ];
        assert_eq!(
            analyses_block(&rs),
            "Article 1 Analysis:\nHigh Opportunity\n\nArticle 2 Analysis:\nLow Opportunity"
        );
        let p = combined_prompt(&analyses_block(&rs));
        assert!(p.contains("**Individual Article Analyses:**\nArticle 1 Analysis:"));
    }
}
