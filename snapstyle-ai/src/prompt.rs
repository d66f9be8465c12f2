//! Instruction text sent with every request.

/// Key color the provider is asked to paint behind the subject.
pub const KEY_COLOR: [u8; 3] = [255, 0, 255];

const PRESERVE: &str =
    "Preserve the foreground subject exactly as it is. Remove any border or frame around it.";


const WHITE_BACKGROUND: &str = "Place the subject on a clean, plain white background.";

/// Build the instruction for a background request.
///
/// `transparent` asks for the flat key color that the chroma-key pass
/// removes afterwards; otherwise a plain white background is requested.
/// Without a source image the text describes the picture to create.
#[must_use]
pub fn background_prompt(transparent: bool, has_source: bool) -> String {
    let background = if transparent {
        let [r, g, b] = KEY_COLOR;
        format!(
            "Place the subject on a completely flat, solid magenta (#{r:02X}{g:02X}{b:02X}) \
             background with no gradients, shadows, texture or lighting variation."
        )
    } else {
        WHITE_BACKGROUND.to_string()
    };
    if has_source {
        format!("Edit this image. {PRESERVE} {background}")
    } else {
        format!(
            "Generate a clean product-style image of a single centered subject. \
             {PRESERVE} {background}"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_depends_on_transparency() {
        let keyed = background_prompt(true, true);
        let white = background_prompt(false, true);
        assert!(keyed.contains("magenta (#FF00FF)"));
        assert!(!white.contains("magenta"));
        assert!(white.contains("white"));
        for prompt in [keyed, white, background_prompt(true, false)] {
            assert!(prompt.contains("Preserve the foreground subject"));
            assert!(prompt.contains("border or frame"));
        }
    }
}
