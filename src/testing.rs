//! Test fixtures: small, well-formed PDFs built in memory

/// Builds a PDF with a correct cross-reference table.
///
/// Every page carries a black 72pt square near its top-left corner so
/// renders are not blank.
#[derive(Debug, Default, Clone)]
pub struct PdfFixture {
    pages: Vec<(f32, f32, i32)>,
}

impl PdfFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, width: f32, height: f32) -> Self {
        self.rotated_page(width, height, 0)
    }

    pub fn rotated_page(mut self, width: f32, height: f32, rotate: i32) -> Self {
        self.pages.push((width, height, rotate));
        self
    }

    pub fn pages(mut self, count: usize, width: f32, height: f32) -> Self {
        for _ in 0..count {
            self.pages.push((width, height, 0));
        }
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut objects: Vec<String> = Vec::new();

        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", 3 + i * 2))
            .collect();
        objects.push("<< /Type /Catalog /Pages 2 0 R >>".to_string());
        objects.push(format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            self.pages.len()
        ));

        for (i, (width, height, rotate)) in self.pages.iter().enumerate() {
            let content = format!("0 0 0 rg 36 {} 72 72 re f", height - 108.0);
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] /Rotate {} /Contents {} 0 R /Resources << >> >>",
                width,
                height,
                rotate,
                4 + i * 2
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ));
        }

        let mut out = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, body) in objects.iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
                objects.len() + 1,
                xref_offset
            )
            .as_bytes(),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let data = PdfFixture::new().page(612.0, 792.0).build();
        let text = String::from_utf8(data.clone()).unwrap();

        let xref_at: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .unwrap()
            .parse()
            .unwrap();
        assert!(text[xref_at..].starts_with("xref"));

        let first_entry = text[xref_at..].lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(text[offset..].starts_with("1 0 obj"));
    }
}
