use bytesync_frame::OwnedFrame;

use crate::cmd::EncodeArgs;
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_raw, to_hex};

pub fn run(args: EncodeArgs) -> CliResult<i32> {
    let payload = args.payload.resolve()?;
    let wire = OwnedFrame::new(args.flags, args.seq, args.msg_type, payload)
        .and_then(|frame| frame.to_bytes())
        .map_err(|err| frame_error("encode failed", err))?;

    if args.hex_output {
        println!("{}", to_hex(&wire));
    } else {
        print_raw(&wire);
    }
    Ok(SUCCESS)
}
