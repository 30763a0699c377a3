// ABOUTME: PPTX generation module for the image-deck application
// ABOUTME: Serializes a built deck into an OOXML presentation package

use crate::config::DeckConfig;
use crate::deck::{build_deck, AudioAttachment, Deck, ImageSlide, Slide};
use crate::errors::{DeckError, Result};
use crate::layout::{Rect, EMU_PER_INCH};
use crate::media::content_type_for;
use crate::templates::*;
use crate::utils::ensure_parent_directory_exists;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use log::info;
use quick_xml::escape::escape;
use std::collections::BTreeSet;
use std::fs;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use zip::{write::FileOptions, ZipWriter};

const AUDIO_POSTER_NAME: &str = "audio_poster.png";
const CONTENT_SHAPE_ID: u32 = 2;
const AUDIO_SHAPE_ID: u32 = 3;
/// Horizontal and vertical padding around title text
const TITLE_INSET: i64 = EMU_PER_INCH / 2;
/// Title text size in hundredths of a point
const TITLE_FONT_SIZE: u32 = 4400;

/// Relationships of a single package part, numbered in insertion order
#[derive(Debug, Default)]
struct Relationships {
    entries: Vec<(&'static str, String)>,
}

impl Relationships {
    /// Register a relationship and return its `rId`
    fn add(&mut self, rel_type: &'static str, target: impl Into<String>) -> String {
        self.entries.push((rel_type, target.into()));
        format!("rId{}", self.entries.len())
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
        );
        for (i, (rel_type, target)) in self.entries.iter().enumerate() {
            xml.push_str(&format!(
                r#"    <Relationship Id="rId{}" Type="{}" Target="{}"/>"#,
                i + 1,
                rel_type,
                escape(target.as_str())
            ));
            xml.push('\n');
        }
        xml.push_str("</Relationships>");
        xml
    }
}

/// Build the deck described by `config` and write it to `config.output`
pub fn generate_pptx(config: &DeckConfig) -> Result<Deck> {
    info!("Generating PPTX from images in {:?}", config.images_dir);

    let deck = build_deck(config)?;
    if deck.is_empty() {
        return Err(DeckError::NoSlides(config.images_dir.clone()));
    }

    save(&deck, &config.output)?;
    Ok(deck)
}

/// Serialize `deck` to `output_file`, replacing any previous file
pub fn save(deck: &Deck, output_file: &Path) -> Result<()> {
    ensure_parent_directory_exists(output_file)?;

    let buffer = write_package(deck, Cursor::new(Vec::new()))?.into_inner();

    info!("Writing PPTX to {:?}", output_file);
    fs::write(output_file, buffer).map_err(|e| DeckError::io(output_file, e))?;

    info!("PPTX file created at {:?} ({} slides)", output_file, deck.len());
    Ok(())
}

/// Write the complete presentation package for `deck` into `writer`
pub fn write_package<W: Write + Seek>(deck: &Deck, writer: W) -> Result<W> {
    let mut zip = ZipWriter::new(writer);

    info!("Creating PPTX structure: [Content_Types].xml");
    write_part(&mut zip, "[Content_Types].xml", content_types_xml(deck).as_bytes())?;

    let mut root_rels = Relationships::default();
    root_rels.add(REL_OFFICE_DOCUMENT, "ppt/presentation.xml");
    root_rels.add(REL_CORE_PROPERTIES, "docProps/core.xml");
    root_rels.add(REL_EXTENDED_PROPERTIES, "docProps/app.xml");
    write_part(&mut zip, "_rels/.rels", root_rels.to_xml().as_bytes())?;

    info!("Creating PPTX structure: docProps");
    write_part(&mut zip, "docProps/app.xml", app_xml(deck).as_bytes())?;
    write_part(&mut zip, "docProps/core.xml", core_xml(deck).as_bytes())?;

    info!("Creating PPTX structure: ppt/presentation.xml");
    let mut pres_rels = Relationships::default();
    pres_rels.add(REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    pres_rels.add(REL_THEME, "theme/theme1.xml");
    let slide_rel_ids: Vec<String> = (1..=deck.len())
        .map(|n| pres_rels.add(REL_SLIDE, format!("slides/slide{}.xml", n)))
        .collect();
    write_part(
        &mut zip,
        "ppt/_rels/presentation.xml.rels",
        pres_rels.to_xml().as_bytes(),
    )?;
    write_part(
        &mut zip,
        "ppt/presentation.xml",
        presentation_xml(deck, &slide_rel_ids).as_bytes(),
    )?;

    info!("Creating PPTX structure: slide master, layout and theme");
    write_part(&mut zip, SLIDE_MASTER_PART, SLIDE_MASTER_XML.as_bytes())?;
    write_part(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        SLIDE_MASTER_RELS_XML.as_bytes(),
    )?;
    write_part(&mut zip, SLIDE_LAYOUT_PART, SLIDE_LAYOUT_XML.as_bytes())?;
    write_part(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        SLIDE_LAYOUT_RELS_XML.as_bytes(),
    )?;
    write_part(&mut zip, THEME_PART, THEME_XML.as_bytes())?;

    if let Some(audio) = &deck.audio {
        info!("Adding audio to PPTX: ppt/media/{}", audio_media_name(audio));
        write_part(
            &mut zip,
            &format!("ppt/media/{}", audio_media_name(audio)),
            &audio.data,
        )?;
        write_part(
            &mut zip,
            &format!("ppt/media/{}", AUDIO_POSTER_NAME),
            &audio_poster_png()?,
        )?;
    }

    for (i, slide) in deck.slides.iter().enumerate() {
        let slide_num = i + 1;
        info!("Processing slide {}", slide_num);

        if let Slide::Image(image) = slide {
            let name = image_media_name(slide_num, image);
            info!("Adding image to PPTX: ppt/media/{}", name);
            write_part(&mut zip, &format!("ppt/media/{}", name), &image.data)?;
        }

        let mut rels = Relationships::default();
        let xml = slide_xml(deck, slide_num, slide, &mut rels);
        write_part(
            &mut zip,
            &format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
            rels.to_xml().as_bytes(),
        )?;
        write_part(
            &mut zip,
            &format!("ppt/slides/slide{}.xml", slide_num),
            xml.as_bytes(),
        )?;
    }

    info!("Finalizing PPTX file");
    Ok(zip.finish()?)
}

fn write_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str, content: &[u8]) -> Result<()> {
    zip.start_file(name, FileOptions::default())?;
    zip.write_all(content)
        .map_err(|e| DeckError::Package(format!("Failed to write {}: {}", name, e)))
}

fn image_media_name(slide_num: usize, image: &ImageSlide) -> String {
    format!("image{}.{}", slide_num, image.media.format)
}

fn audio_media_name(audio: &AudioAttachment) -> String {
    format!("media1.{}", audio.media.format)
}

/// Placeholder picture PowerPoint shows for the audio object
fn audio_poster_png() -> Result<Vec<u8>> {
    let poster = RgbImage::from_pixel(64, 64, Rgb([96u8, 96u8, 96u8]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(poster).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

fn content_types_xml(deck: &Deck) -> String {
    let mut extensions = BTreeSet::new();
    for slide in &deck.slides {
        if let Slide::Image(image) = slide {
            extensions.insert(image.media.format.clone());
        }
    }
    if let Some(audio) = &deck.audio {
        extensions.insert(audio.media.format.clone());
        extensions.insert("png".to_string());
    }

    let defaults = extensions
        .iter()
        .map(|ext| {
            format!(
                r#"    <Default Extension="{}" ContentType="{}"/>"#,
                ext,
                content_type_for(ext)
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    let slides = (1..=deck.len())
        .map(|n| {
            format!(
                r#"    <Override PartName="/ppt/slides/slide{}.xml" ContentType="{}"/>"#,
                n, CT_SLIDE
            )
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
{defaults}
    <Override PartName="/ppt/presentation.xml" ContentType="{CT_PRESENTATION}"/>
    <Override PartName="/{SLIDE_MASTER_PART}" ContentType="{CT_SLIDE_MASTER}"/>
    <Override PartName="/{SLIDE_LAYOUT_PART}" ContentType="{CT_SLIDE_LAYOUT}"/>
    <Override PartName="/{THEME_PART}" ContentType="{CT_THEME}"/>
    <Override PartName="/docProps/core.xml" ContentType="{CT_CORE_PROPERTIES}"/>
    <Override PartName="/docProps/app.xml" ContentType="{CT_EXTENDED_PROPERTIES}"/>
{slides}
</Types>"#
    )
}

fn app_xml(deck: &Deck) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>image-deck</Application>
    <Slides>{}</Slides>
</Properties>"#,
        deck.len()
    )
}

fn core_xml(deck: &Deck) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:title>{}</dc:title>
    <dc:creator>image-deck</dc:creator>
    <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
    <cp:revision>1</cp:revision>
</cp:coreProperties>"#,
        escape(deck.title.as_str()),
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
}

fn presentation_xml(deck: &Deck, slide_rel_ids: &[String]) -> String {
    let (cx, cy) = deck.size();
    let slide_ids = slide_rel_ids
        .iter()
        .enumerate()
        .map(|(i, rid)| format!(r#"        <p:sldId id="{}" r:id="{}"/>"#, 256 + i, rid))
        .collect::<Vec<String>>()
        .join("\n");

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">
    <p:sldMasterIdLst>
        <p:sldMasterId id="2147483648" r:id="rId1"/>
    </p:sldMasterIdLst>
    <p:sldIdLst>
{slide_ids}
    </p:sldIdLst>
    <p:sldSz cx="{cx}" cy="{cy}" type="{size_type}"/>
    <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#,
        size_type = deck.aspect_ratio.slide_size_type(),
    )
}

/// Slide XML for `slide`; relationships it references are registered in `rels`
fn slide_xml(deck: &Deck, slide_num: usize, slide: &Slide, rels: &mut Relationships) -> String {
    rels.add(REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml");

    let content = match slide {
        Slide::Title(text) => {
            let (cx, cy) = deck.size();
            let area = Rect { x: 0, y: 0, cx, cy }.inset(TITLE_INSET);
            title_shape_xml(text, &area)
        }
        Slide::Image(image) => {
            let rid = rels.add(
                REL_IMAGE,
                format!("../media/{}", image_media_name(slide_num, image)),
            );
            picture_xml(image, &rid)
        }
    };

    let (audio_shape, timing) = match (&deck.audio, slide_num) {
        (Some(audio), 1) => {
            let target = format!("../media/{}", audio_media_name(audio));
            let audio_rid = rels.add(REL_AUDIO, target.clone());
            let media_rid = rels.add(REL_MEDIA, target);
            let poster_rid = rels.add(REL_IMAGE, format!("../media/{}", AUDIO_POSTER_NAME));
            (
                audio_shape_xml(audio, &audio_rid, &media_rid, &poster_rid),
                autoplay_timing_xml(AUDIO_SHAPE_ID),
            )
        }
        _ => (String::new(), String::new()),
    };

    let transition = deck
        .auto_advance_ms
        .map(|ms| format!(r#"<p:transition advClick="0" advTm="{}"/>"#, ms))
        .unwrap_or_default();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:cSld>
        <p:spTree>
            <p:nvGrpSpPr>
                <p:cNvPr id="1" name=""/>
                <p:cNvGrpSpPr/>
                <p:nvPr/>
            </p:nvGrpSpPr>
            <p:grpSpPr>
                <a:xfrm>
                    <a:off x="0" y="0"/>
                    <a:ext cx="0" cy="0"/>
                    <a:chOff x="0" y="0"/>
                    <a:chExt cx="0" cy="0"/>
                </a:xfrm>
            </p:grpSpPr>
{content}{audio_shape}
        </p:spTree>
    </p:cSld>
    <p:clrMapOvr>
        <a:masterClrMapping/>
    </p:clrMapOvr>
{transition}{timing}
</p:sld>"#
    )
}

fn xfrm_xml(rect: &Rect) -> String {
    format!(
        r#"<a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm>"#,
        rect.x, rect.y, rect.cx, rect.cy
    )
}

fn title_shape_xml(text: &str, area: &Rect) -> String {
    format!(
        r#"            <p:sp>
                <p:nvSpPr>
                    <p:cNvPr id="{id}" name="Title"/>
                    <p:cNvSpPr txBox="1"/>
                    <p:nvPr/>
                </p:nvSpPr>
                <p:spPr>
                    {xfrm}
                    <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
                    <a:noFill/>
                </p:spPr>
                <p:txBody>
                    <a:bodyPr wrap="square" anchor="ctr"><a:normAutofit/></a:bodyPr>
                    <a:lstStyle/>
                    <a:p>
                        <a:pPr algn="ctr"/>
                        <a:r><a:rPr lang="en-US" sz="{size}" b="1" dirty="0"/><a:t>{text}</a:t></a:r>
                    </a:p>
                </p:txBody>
            </p:sp>
"#,
        id = CONTENT_SHAPE_ID,
        xfrm = xfrm_xml(area),
        size = TITLE_FONT_SIZE,
        text = escape(text),
    )
}

fn picture_xml(image: &ImageSlide, rid: &str) -> String {
    format!(
        r#"            <p:pic>
                <p:nvPicPr>
                    <p:cNvPr id="{id}" name="{name}"/>
                    <p:cNvPicPr>
                        <a:picLocks noChangeAspect="1"/>
                    </p:cNvPicPr>
                    <p:nvPr/>
                </p:nvPicPr>
                <p:blipFill>
                    <a:blip r:embed="{rid}"/>
                    <a:stretch>
                        <a:fillRect/>
                    </a:stretch>
                </p:blipFill>
                <p:spPr>
                    {xfrm}
                    <a:prstGeom prst="rect">
                        <a:avLst/>
                    </a:prstGeom>
                </p:spPr>
            </p:pic>
"#,
        id = CONTENT_SHAPE_ID,
        name = escape(image.media.file_name().as_str()),
        xfrm = xfrm_xml(&image.placement),
    )
}

/// Small audio icon in the top-left corner linked to the embedded track
fn audio_shape_xml(audio: &AudioAttachment, audio_rid: &str, media_rid: &str, poster_rid: &str) -> String {
    let rect = Rect {
        x: EMU_PER_INCH / 10,
        y: EMU_PER_INCH / 10,
        cx: EMU_PER_INCH / 5,
        cy: EMU_PER_INCH / 5,
    };
    format!(
        r#"            <p:pic>
                <p:nvPicPr>
                    <p:cNvPr id="{id}" name="{name}">
                        <a:hlinkClick r:id="" action="ppaction://media"/>
                    </p:cNvPr>
                    <p:cNvPicPr>
                        <a:picLocks noChangeAspect="1"/>
                    </p:cNvPicPr>
                    <p:nvPr>
                        <a:audioFile r:link="{audio_rid}"/>
                        <p:extLst>
                            <p:ext uri="{{DAA4B4D4-6D71-4841-9C94-3DE7FCFB9230}}">
                                <p14:media xmlns:p14="http://schemas.microsoft.com/office/powerpoint/2010/main" r:embed="{media_rid}"/>
                            </p:ext>
                        </p:extLst>
                    </p:nvPr>
                </p:nvPicPr>
                <p:blipFill>
                    <a:blip r:embed="{poster_rid}"/>
                    <a:stretch>
                        <a:fillRect/>
                    </a:stretch>
                </p:blipFill>
                <p:spPr>
                    {xfrm}
                    <a:prstGeom prst="rect">
                        <a:avLst/>
                    </a:prstGeom>
                </p:spPr>
            </p:pic>
"#,
        id = AUDIO_SHAPE_ID,
        name = escape(audio.media.file_name().as_str()),
        xfrm = xfrm_xml(&rect),
    )
}

/// Timing tree that plays shape `spid` from the start as soon as the slide begins
fn autoplay_timing_xml(spid: u32) -> String {
    format!(
        r#"    <p:timing>
        <p:tnLst>
            <p:par>
                <p:cTn id="1" dur="indefinite" restart="never" nodeType="tmRoot">
                    <p:childTnLst>
                        <p:seq concurrent="1" nextAc="seek">
                            <p:cTn id="2" dur="indefinite" nodeType="mainSeq">
                                <p:childTnLst>
                                    <p:par>
                                        <p:cTn id="3" fill="hold">
                                            <p:stCondLst>
                                                <p:cond delay="indefinite"/>
                                                <p:cond evt="onBegin" delay="0"><p:tn val="2"/></p:cond>
                                            </p:stCondLst>
                                            <p:childTnLst>
                                                <p:par>
                                                    <p:cTn id="4" fill="hold">
                                                        <p:stCondLst><p:cond delay="0"/></p:stCondLst>
                                                        <p:childTnLst>
                                                            <p:par>
                                                                <p:cTn id="5" presetID="1" presetClass="mediacall" presetSubtype="0" fill="hold" nodeType="afterEffect">
                                                                    <p:stCondLst><p:cond delay="0"/></p:stCondLst>
                                                                    <p:childTnLst>
                                                                        <p:cmd type="call" cmd="playFrom(0.0)">
                                                                            <p:cBhvr>
                                                                                <p:cTn id="6" dur="1" fill="hold"/>
                                                                                <p:tgtEl><p:spTgt spid="{spid}"/></p:tgtEl>
                                                                            </p:cBhvr>
                                                                        </p:cmd>
                                                                    </p:childTnLst>
                                                                </p:cTn>
                                                            </p:par>
                                                        </p:childTnLst>
                                                    </p:cTn>
                                                </p:par>
                                            </p:childTnLst>
                                        </p:cTn>
                                    </p:par>
                                </p:childTnLst>
                            </p:cTn>
                            <p:prevCondLst><p:cond evt="onPrev" delay="0"><p:tgtEl><p:sldTgt/></p:tgtEl></p:cond></p:prevCondLst>
                            <p:nextCondLst><p:cond evt="onNext" delay="0"><p:tgtEl><p:sldTgt/></p:tgtEl></p:cond></p:nextCondLst>
                        </p:seq>
                        <p:audio>
                            <p:cMediaNode vol="80000">
                                <p:cTn id="7" fill="hold" display="0">
                                    <p:stCondLst><p:cond delay="indefinite"/></p:stCondLst>
                                    <p:endCondLst><p:cond evt="onStopAudio" delay="0"><p:tgtEl><p:sldTgt/></p:tgtEl></p:cond></p:endCondLst>
                                </p:cTn>
                                <p:tgtEl><p:spTgt spid="{spid}"/></p:tgtEl>
                            </p:cMediaNode>
                        </p:audio>
                    </p:childTnLst>
                </p:cTn>
            </p:par>
        </p:tnLst>
    </p:timing>"#
    )
}
