use bytesync_frame::parse_frame;
use tracing::debug;

use crate::cmd::{parse_hex, read_file, ValidateArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let raw = match (&args.hex, &args.file) {
        (Some(hex), _) => parse_hex(hex)?,
        (None, Some(path)) => read_file(path)?,
        (None, None) => return Err(CliError::usage("one of --hex or --file is required")),
    };

    let frame = parse_frame(&raw, args.max_frame_len)
        .map_err(|err| frame_error("invalid frame", err))?;

    let trailing = raw.len() - usize::from(frame.length);
    if trailing > 0 {
        debug!(trailing, "ignoring bytes after the frame");
    }

    print_frame(&frame.into_owned(), format);
    Ok(SUCCESS)
}
