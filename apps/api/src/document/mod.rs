// Document model: the write-once tree the template builders produce and the
// serializers consume. Styles are symbolic roles resolved through the static
// catalog in `style`, so one model can be serialized to either format.

pub mod model;
pub mod segment;
pub mod style;

pub use model::{
    Alignment, Block, ColorRole, ColumnSpec, DocumentModel, FontToken, Paragraph,
    ParagraphStyle, RunStyle, Section, SectionKind, SizeScale, StyledRun, TableCell,
    TableRegion, TableRow,
};
pub use segment::{segment, segment_paragraphs, SegmentSpacing};
pub use style::{style_for, TemplateStyle};
