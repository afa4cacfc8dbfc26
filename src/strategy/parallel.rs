//! Parallel Batch Annotation
//!
//! Uses Rayon to run one builder per input while every invocation shares
//! the annotator's prepared event source.

use rayon::prelude::*;

use crate::annotator::{Annotated, Annotator, Report};
use crate::dom::AnnotationDocument;
use crate::error::Result;
use crate::events::EventSource;

/// Annotate many inputs in parallel, results in input order
pub fn annotate_batch<S, I>(annotator: &Annotator<S>, inputs: &[I]) -> Vec<Result<Annotated>>
where
    S: EventSource + Send + Sync,
    I: AsRef<str> + Sync,
{
    inputs
        .par_iter()
        .map(|input| annotator.annotate(input.as_ref()))
        .collect()
}

/// Annotate many documents in place, in parallel
pub fn annotate_batch_into<S>(
    annotator: &Annotator<S>,
    documents: &mut [AnnotationDocument],
) -> Vec<Result<Report>>
where
    S: EventSource + Send + Sync,
{
    documents
        .par_iter_mut()
        .map(|document| annotator.annotate_into(document))
        .collect()
}

impl<S: EventSource + Send + Sync> Annotator<S> {
    /// See [`annotate_batch`]
    pub fn annotate_batch<I: AsRef<str> + Sync>(&self, inputs: &[I]) -> Vec<Result<Annotated>> {
        annotate_batch(self, inputs)
    }

    /// See [`annotate_batch_into`]
    pub fn annotate_batch_into(&self, documents: &mut [AnnotationDocument]) -> Vec<Result<Report>> {
        annotate_batch_into(self, documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnnotateError;
    use crate::events::EventHandler;

    /// One `line` nonterminal per newline-terminated line, fails on `!`
    fn lines(input: &str, handler: &mut dyn EventHandler) -> Result<()> {
        let mut open = false;
        for (at, ch) in input.chars().enumerate() {
            if ch == '!' {
                return Err(AnnotateError::source("bang", at));
            }
            if !open && ch != '\n' {
                handler.start_nonterminal("line")?;
                open = true;
            }
            if open && ch == '\n' {
                handler.end_nonterminal("line")?;
                open = false;
            }
            handler.terminal(ch as u32)?;
        }
        if open {
            handler.end_nonterminal("line")?;
        }
        Ok(())
    }

    type Lines = fn(&str, &mut dyn EventHandler) -> Result<()>;

    #[test]
    fn test_batch_keeps_input_order() {
        let annotator = Annotator::new(lines as Lines);
        let inputs: Vec<String> = (0..64).map(|n| "x\n".repeat(n % 5 + 1)).collect();

        let results = annotator.annotate_batch(&inputs);
        assert_eq!(results.len(), inputs.len());
        for (n, result) in results.iter().enumerate() {
            let annotated = result.as_ref().unwrap();
            assert_eq!(annotated.document.text(), inputs[n]);
            assert_eq!(annotated.report.roots, n % 5 + 1);
        }
    }

    #[test]
    fn test_batch_failures_stay_per_input() {
        let options = crate::config::Options::default().with_fail_on_error(true);
        let annotator = Annotator::new(lines as Lines).with_options(options);

        let results = annotator.annotate_batch(&["ok", "no!", "fine\n"]);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(AnnotateError::Source { cursor: 2, .. })));
        assert!(results[2].is_ok());
    }

    #[test]
    fn test_batch_into_documents() {
        let annotator = Annotator::new(lines as Lines);
        let mut documents = vec![
            AnnotationDocument::new("a\nb"),
            AnnotationDocument::new("c"),
        ];
        documents[1].add_span("p", 0..1).unwrap();

        let reports = annotator.annotate_batch_into(&mut documents);
        assert!(reports.iter().all(|r| r.is_ok()));
        assert_eq!(documents[0].outline(), "line[0,1) line[2,3)");
        assert_eq!(documents[1].outline(), "p[0,1){line[0,1)}");
    }
}
