use std::path::PathBuf;

xflags::xflags! {
    /// Scaffolds and renders standard-name documentation.
    cmd quill {
        /// Project directory. Defaults to the current directory.
        optional -p, --project project: PathBuf

        /// Writes one page per primary tag and rewrites the site navigation.
        cmd scaffold {}

        /// Renders a page template to stdout or to a file.
        cmd render {
            required template: PathBuf
            /// Write the rendered page here instead of stdout.
            optional -o, --output output: PathBuf
        }

        /// Prints record counts.
        cmd stats {}
    }
}
