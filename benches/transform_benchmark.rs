//! Benchmarks for the Markdown and PDF transformation paths.
//!
//! Run with: cargo bench
//!
//! Inputs are synthetic: hearing-style Markdown with many sections and
//! CriticMarkup comments, and a hand-written PDF for extraction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use mddoc::markdown::{extract_critic_markup, insert_block_in_sections, InsertionBlock};
use mddoc::{CleanupOptions, CleanupPipeline, DocxBuilder, ExtractOptions, WordDocument};

/// Markdown with `sections` level-2 sections, each with one comment.
fn create_test_markdown(sections: usize) -> String {
    let mut md = String::from("# Forslag til svar\n\n");
    for i in 0..sections {
        md.push_str(&format!(
            "## Emne {}\nBorgeren skriver {{==punkt {}==}}{{>>Henvendelse {} kræver **svar**<<}} om *trafik*.\n\n",
            i + 1,
            i + 1,
            i + 1
        ));
    }
    md
}

/// Creates a minimal synthetic PDF with the given number of pages.
fn create_test_pdf(page_count: usize) -> Vec<u8> {
    let mut content = String::from("%PDF-1.4\n");
    content.push_str("1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    let kids: Vec<String> = (0..page_count).map(|i| format!("{} 0 R", i * 2 + 3)).collect();
    content.push_str(&format!(
        "2 0 obj\n<< /Type /Pages /Kids [{}] /Count {} >>\nendobj\n",
        kids.join(" "),
        page_count
    ));

    for i in 0..page_count {
        let page_obj = i * 2 + 3;
        let content_obj = page_obj + 1;
        content.push_str(&format!(
            "{} 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents {} 0 R >>\nendobj\n",
            page_obj, content_obj
        ));
        let text = format!(
            "BT /F1 12 Tf 100 700 Td (Side {} - indhold til benchmark af udtraek.) Tj ET",
            i + 1
        );
        content.push_str(&format!(
            "{} 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
            content_obj,
            text.len(),
            text
        ));
    }

    let size = page_count * 2 + 3;
    content.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\n%%EOF\n",
        size
    ));
    content.into_bytes()
}

fn bench_critic_extraction(c: &mut Criterion) {
    let md = create_test_markdown(50);
    c.bench_function("critic_extraction_50_sections", |b| {
        b.iter(|| extract_critic_markup(black_box(&md)));
    });
}

fn bench_section_insertion(c: &mut Criterion) {
    let md = create_test_markdown(50);
    let block = InsertionBlock::from_template("### Forvaltningens svar\nSvar udestår.");
    let markers = vec!["### Forvaltningens svar".to_string()];

    c.bench_function("section_insertion_50_sections", |b| {
        b.iter(|| insert_block_in_sections(black_box(&md), &block, &markers));
    });
}

fn bench_docx_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("docx_build");
    let builder = DocxBuilder::default();

    for sections in [5, 50].iter() {
        let md = create_test_markdown(*sections);
        group.bench_function(format!("{}_sections", sections), |b| {
            b.iter(|| {
                let mut doc = WordDocument::blank().unwrap();
                builder.build(&mut doc, black_box(&md), None).unwrap();
                doc.to_bytes().unwrap()
            });
        });
    }

    group.finish();
}

fn bench_pdf_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("pdf_extraction");

    for page_count in [1, 10].iter() {
        let data = create_test_pdf(*page_count);
        group.bench_function(format!("{}_pages", page_count), |b| {
            b.iter(|| {
                // Lenient: the synthetic file has no xref table
                let options = ExtractOptions::new().lenient();
                let _ = mddoc::extract_markdown_bytes(black_box(&data), options);
            });
        });
    }

    group.finish();
}

fn bench_cleanup(c: &mut Criterion) {
    let text = "ﬁnal  \n\n\n\nCafe\u{301} \u{FFFD}tekst\t\n".repeat(200);
    let pipeline = CleanupPipeline::new(CleanupOptions::standard());
    c.bench_function("cleanup_standard", |b| {
        b.iter(|| pipeline.process(black_box(&text)));
    });
}

criterion_group!(
    benches,
    bench_critic_extraction,
    bench_section_insertion,
    bench_docx_build,
    bench_pdf_extraction,
    bench_cleanup,
);
criterion_main!(benches);
