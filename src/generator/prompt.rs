//! Page generation prompt template.

use crate::palette::Palette;

/// Build the generation instruction for one school page.
///
/// Pure templating: the same name, logo, palette, and region always produce
/// the identical instruction. All variability in the output page comes from
/// the generation collaborator, never from this function.
pub fn build_page_prompt(
    school_name: &str,
    logo_url: &str,
    palette: &Palette,
    region: &str,
) -> String {
    format!(
        r#"You are an expert web developer specializing in TailwindCSS. Your task is to generate a complete, single HTML file for a school website based on live web search results.
**Instructions:**
1. Create a modern, professional, and visually appealing school website for **{name} high school, {region}**.
2. Use the **TailwindCSS** framework for all styling. You must include the Tailwind CDN script in the <head> section: <script src="https://cdn.tailwindcss.com"></script>.
3. Hero Section: Prominently feature the school's logo, found at this URL: **{logo_url}**.
4. Color Palette: Strictly use the following colors for the theme:
    - Primary (headings, buttons): **{primary}**
    - Secondary (backgrounds, borders): **{secondary}**
    - Accent (calls-to-action, links): **{accent}**
5. Content (Crucial): Use your web search tool to find the most current and factual information about {name}, {region}. Include sections for About Us, Academics, Admissions, and Contact Us.
6. Contact Us Section: Ensure the physical address, phone number, and email are as accurate as possible based on your search results. Include a contact form.
7. Contact Form: The form must not refresh the page on submission. Use an inline JavaScript onsubmit attribute to show an alert: alert('Thank you! We will get back to you shortly.'); return false;
8. For the image placeholders, just use the colored containers with colors coming from the color palette provided
Generate only the full HTML code, starting with <!DOCTYPE html> and ending with </html>. Do not wrap your response in markdown."#,
        name = school_name,
        region = region,
        logo_url = logo_url,
        primary = palette.primary,
        secondary = palette.secondary,
        accent = palette.accent,
    )
}
