pub const REPORT_SYSTEM_PROMPT: &str = r#"You are an expert document designer specializing in creating well-formatted, professional PDF content from analyzed video data.

Create comprehensive HTML content that will be converted to PDF. The content should be:
1. Well-structured with proper headings and sections
2. Visually appealing with good use of white space
3. Professional and easy to read
4. Include all the analyzed information in a logical flow

IMPORTANT: Return ONLY pure HTML content without any markdown code block markers (```html or ```). Do not wrap your response in code blocks.

Use proper HTML structure with semantic elements. Do not include <html>, <head>, or <body> tags - just the content that goes inside the body.

Include CSS styles using <style> tags for:
- Typography and fonts
- Colors and spacing
- Layout and structure
- Professional appearance

The document should flow well and be suitable for both digital reading and printing."#;

/// Inline styles of the fallback template
pub const FALLBACK_STYLE: &str = r#"<style>
    body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; margin: 0; padding: 20px; }
    .header { text-align: center; border-bottom: 2px solid #333; padding-bottom: 20px; margin-bottom: 30px; }
    .title { color: #333; font-size: 28px; margin-bottom: 10px; }
    .meta { color: #666; font-size: 14px; }
    .section { margin-bottom: 30px; }
    .section h2 { color: #333; border-left: 4px solid #007acc; padding-left: 15px; }
    .section h3 { color: #555; }
    ul { padding-left: 20px; }
    li { margin-bottom: 5px; }
    .summary { background-color: #f8f9fa; padding: 20px; border-radius: 5px; margin-bottom: 20px; }
</style>"#;
